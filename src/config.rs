//! Process configuration
//!
//! Endpoint and credential pairs for the two external collaborators: the
//! hosted store (URL + service key) and the generation API (key + model).
//! Values are read from the environment once at startup. Missing values are
//! not rejected here; the first client that needs one fails with a
//! configuration hint.

use std::path::PathBuf;

/// Default generation model, matching the hosted API's fast tier.
pub const DEFAULT_GENAI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the hosted store, e.g. "https://xyz.supabase.co"
    pub store_url: String,
    /// Store service key, sent as the `apikey` header
    pub store_key: String,
    /// Generation API key
    pub genai_api_key: String,
    /// Generation model identifier
    pub genai_model: String,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            store_url: std::env::var("ST_STORE_URL").unwrap_or_default(),
            store_key: std::env::var("ST_STORE_KEY").unwrap_or_default(),
            genai_api_key: std::env::var("ST_GENAI_API_KEY").unwrap_or_default(),
            genai_model: std::env::var("ST_GENAI_MODEL")
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_GENAI_MODEL.to_string()),
        }
    }
}

/// Path of the persisted session file.
///
/// `ST_SESSION_FILE` overrides the default `~/.smarttask/session.json`
/// (used by tests to isolate state).
pub fn session_file_path() -> PathBuf {
    if let Ok(path) = std::env::var("ST_SESSION_FILE") {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".smarttask").join("session.json")
}
