// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod ai;
pub mod api;
pub mod config;
pub mod dates;
pub mod error;
pub mod expansion;
pub mod keywords;
pub mod metrics;
pub mod normalize;
pub mod providers;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
