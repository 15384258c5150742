//! Client configuration.

use serde::{Deserialize, Serialize};

/// Base URL used when none is configured; the WebUI's default listen address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7860";

/// Settings fixed for the lifetime of a `Client`.
///
/// Deserializes from JSON with every field optional, so `{}` yields the
/// default configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix for every request path, e.g. `http://127.0.0.1:7860`.
    pub base_url: String,
}

impl Config {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }

    /// Replace an empty base URL with the default.
    pub fn with_defaults(mut self) -> Self {
        if self.base_url.is_empty() {
            self.base_url = DEFAULT_BASE_URL.to_string();
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, "http://127.0.0.1:7860");
    }

    #[test]
    fn base_url_is_kept_verbatim() {
        let config: Config = serde_json::from_str(r#"{"base_url":"http://gpu-box:7861/"}"#).unwrap();
        assert_eq!(config.base_url, "http://gpu-box:7861/");
    }

    #[test]
    fn with_defaults_fills_only_empty_url() {
        assert_eq!(Config::new("").with_defaults(), Config::default());
        assert_eq!(
            Config::new("http://x:1").with_defaults().base_url,
            "http://x:1"
        );
    }
}
