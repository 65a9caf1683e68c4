// ⚙️ Client Configuration
// Where the bank backend lives and how to talk to it
//
// Sources, later ones winning:
// 1. Defaults
// 2. Optional TOML file
// 3. FAMILY_BANK_* environment variables

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const ENV_URL: &str = "FAMILY_BANK_URL";
pub const ENV_TIMEOUT: &str = "FAMILY_BANK_TIMEOUT_SECS";
pub const ENV_SESSION: &str = "FAMILY_BANK_SESSION";
pub const ENV_CONFIG: &str = "FAMILY_BANK_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend root, e.g. `http://localhost:5000`
    pub base_url: String,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Value of the backend's `session` cookie, for a logged-in parent
    pub session_cookie: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
            session_cookie: None,
        }
    }
}

impl ClientConfig {
    /// Load from a TOML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: ClientConfig = toml::from_str(&content).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the file named by `FAMILY_BANK_CONFIG` if set, then
    /// the remaining environment variables
    pub fn load() -> Result<Self> {
        let base = match std::env::var(ENV_CONFIG) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value source
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL) {
            self.base_url = url;
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            self.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT, timeout))?;
        }

        if let Some(session) = lookup(ENV_SESSION) {
            self.session_cookie = Some(session).filter(|s| !s.is_empty());
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(anyhow!("base_url must start with http:// or https://, got '{}'", self.base_url));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    /// Absolute URL for an API path such as `/api/accounts`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.timeout_secs, 10);
        assert!(config.session_cookie.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_URL, "https://bank.example.org/"),
            (ENV_TIMEOUT, "30"),
            (ENV_SESSION, "abc123"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.session_cookie.as_deref(), Some("abc123"));
        assert_eq!(config.endpoint("/api/accounts"), "https://bank.example.org/api/accounts");
    }

    #[test]
    fn test_bad_overrides() {
        let result = ClientConfig::default().with_overrides(|key| (key == ENV_TIMEOUT).then(|| "soon".to_string()));
        assert!(result.is_err());

        let result = ClientConfig::default().with_overrides(|key| (key == ENV_URL).then(|| "localhost:5000".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: ClientConfig = toml::from_str("base_url = \"http://10.0.0.2:5000\"").unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.timeout_secs, 10);
    }
}
