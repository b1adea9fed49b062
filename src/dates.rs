// src/dates.rs
//! Publish-date coalescing.
//!
//! Every provider ships its own date shape, so adapters tag the raw value
//! at the boundary and coalescing is a per-variant match — there is no
//! cross-provider field-priority chain to get wrong.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

/// Provider-tagged raw publish date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawDate {
    /// ISO-8601 / RFC-3339 string (YouTube Data API `publishedAt`).
    Iso(String),
    /// RFC-2822 string (Naver news `pubDate`).
    Rfc2822(String),
    /// 8-digit `YYYYMMDD` (Naver blog/cafe `postdate`).
    Compact(String),
}

/// Normalize a tagged raw date into an ISO-8601 string.
/// Returns `None` when the value does not parse; callers omit the field
/// rather than substituting a default.
pub fn coalesce(raw: &RawDate) -> Option<String> {
    match raw {
        // The structured video API already hands us ISO-8601; used as-is.
        RawDate::Iso(s) => Some(s.clone()),
        RawDate::Rfc2822(s) => OffsetDateTime::parse(s, &Rfc2822)
            .ok()
            .and_then(|dt| dt.format(&Rfc3339).ok()),
        RawDate::Compact(s) => coalesce_compact(s),
    }
}

fn coalesce_compact(s: &str) -> Option<String> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}-{}-{}", &s[0..4], &s[4..6], &s[6..8]))
}
