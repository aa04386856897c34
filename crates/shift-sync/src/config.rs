use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for the remote service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    /// Pre-shared key sent in every request body.
    pub api_key: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub country: String,
    pub language: String,
    /// Ask the service for canned test responses instead of touching its database.
    pub test: bool,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// `{base_url}/{endpoint}` with exactly one slash in between.
    pub fn endpoint(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://artanidosatcrowdwareat.pythonanywhere.com".to_string(),
            api_key: String::new(),
            user_agent: "Shift 1.0".to_string(),
            timeout_secs: 30,
            country: String::new(),
            language: "en".to_string(),
            test: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = RemoteConfig::default();
        assert_eq!(c.user_agent, "Shift 1.0");
        assert_eq!(c.timeout(), Duration::from_secs(30));
        assert!(!c.test);
        assert!(c.api_key.is_empty());
    }

    #[test]
    fn endpoint_joins_cleanly() {
        let c = RemoteConfig {
            base_url: "http://localhost:5000/".into(),
            ..RemoteConfig::default()
        };
        assert_eq!(c.endpoint("register"), "http://localhost:5000/register");
        assert_eq!(c.endpoint("/matelist"), "http://localhost:5000/matelist");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c: RemoteConfig = toml::from_str("api_key = \"s3cret\"\ntimeout_secs = 5\n").unwrap();
        assert_eq!(c.api_key, "s3cret");
        assert_eq!(c.timeout(), Duration::from_secs(5));
        assert_eq!(c.user_agent, "Shift 1.0");
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let c = RemoteConfig {
            timeout_secs: 0,
            ..RemoteConfig::default()
        };
        assert_eq!(c.timeout(), Duration::from_secs(1));
    }
}
