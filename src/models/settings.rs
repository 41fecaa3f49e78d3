use serde::{Deserialize, Serialize};

/// Environment variable overriding the backend base URL.
pub const BASE_URL_ENV: &str = "SPLITTER_API_URL";

/// Default backend address for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Client-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ClientSettings {
    /// Read settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}
