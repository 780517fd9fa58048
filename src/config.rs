//! Environment-driven configuration
//!
//! Read once at startup and handed to the components that need it.

use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PORT: u16 = 8080;

/// Sampling temperature for extraction-style prompts
pub const TEMPERATURE: f32 = 0.3;

const PLACEHOLDER_KEYS: &[&str] = &["", "your_gemini_api_key_here", "mock_key"];

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// A missing API key is not an error here; it surfaces as
    /// `MissingCredential` when a provider call is attempted.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup (tests use a map)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("GEMINI_API_KEY").and_then(|key| normalize_api_key(&key));

        let model = lookup("GEMINI_MODEL")
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or(defaults.model);

        let base_url = lookup("GEMINI_BASE_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or(defaults.base_url);

        let timeout = lookup("GEMINI_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let port = lookup("PORT")
            .or_else(|| lookup("API_PORT"))
            .and_then(|p| p.trim().parse::<u16>().ok())
            .unwrap_or(defaults.port);

        Self {
            api_key,
            model,
            base_url,
            timeout,
            port,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

fn normalize_api_key(raw: &str) -> Option<String> {
    let key = raw.trim();
    if PLACEHOLDER_KEYS.contains(&key) {
        None
    } else {
        Some(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_environment_empty() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert!(!config.has_credential());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_placeholder_key_counts_as_missing() {
        let config = Config::from_lookup(lookup_from(&[(
            "GEMINI_API_KEY",
            "your_gemini_api_key_here",
        )]));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "  abc123 "),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_BASE_URL", "http://localhost:9000/v1beta/"),
            ("GEMINI_TIMEOUT_SECS", "5"),
            ("API_PORT", "3001"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.base_url, "http://localhost:9000/v1beta");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn test_port_prefers_port_over_api_port() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "9090"), ("API_PORT", "3001")]));
        assert_eq!(config.port, 9090);
    }
}
