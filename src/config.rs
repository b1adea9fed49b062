// src/config.rs
//! Service configuration: credentials from the environment, tunables from
//! an optional TOML file. Credentials stay optional at load time and are
//! checked per request, so a missing key breaks only the endpoints that
//! need it.

use serde::Deserialize;
use std::{env, fs, path::Path};

use crate::expansion::SearchAdCredentials;

pub const DEFAULT_CONFIG_PATH: &str = "config/scout.toml";
pub const ENV_CONFIG_PATH: &str = "SCOUT_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Per-branch fan-out deadline in seconds.
    pub branch_timeout_secs: u64,
    /// Items per provider for the aggregated /search endpoint.
    pub search_page_size: u32,
    /// Items fetched for keyword/sentiment analysis.
    pub analysis_page_size: u32,
    /// Items sampled for standalone ad-suggestion generation.
    pub suggestion_page_size: u32,
    /// Model for summaries and ad copy.
    pub chat_model: String,
    /// Model for sentiment, classification, Q&A and vision.
    pub analysis_model: String,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            branch_timeout_secs: 15,
            search_page_size: 10,
            analysis_page_size: 20,
            suggestion_page_size: 5,
            chat_model: "gpt-4o-mini".to_string(),
            analysis_model: "gpt-4o".to_string(),
        }
    }
}

impl Tunables {
    /// Load from `SCOUT_CONFIG_PATH` (or the default path). A missing or
    /// unparseable file yields the defaults, with a warning for the latter.
    pub fn load() -> Self {
        let path = env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_file(&path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(s) => match toml::from_str(&s) {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.as_ref().display(),
                        "invalid tunables file, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub naver_client_id: Option<String>,
    pub naver_client_secret: Option<String>,
    pub openai_api_key: Option<String>,
    pub youtube_api_key: Option<String>,
    pub searchad: Option<SearchAdCredentials>,
    pub tunables: Tunables,
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let searchad = match (
            env_opt("SEARCHAD_API_KEY"),
            env_opt("SEARCHAD_SECRET_KEY"),
            env_opt("SEARCHAD_CUSTOMER_ID"),
        ) {
            (Some(api_key), Some(secret_key), Some(customer_id)) => Some(SearchAdCredentials {
                api_key,
                secret_key,
                customer_id,
            }),
            _ => None,
        };

        Self {
            naver_client_id: env_opt("NAVER_CLIENT_ID"),
            naver_client_secret: env_opt("NAVER_CLIENT_SECRET"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            youtube_api_key: env_opt("YOUTUBE_API_KEY"),
            searchad,
            tunables: Tunables::load(),
        }
    }

    pub fn naver_configured(&self) -> bool {
        self.naver_client_id.is_some() && self.naver_client_secret.is_some()
    }
}
