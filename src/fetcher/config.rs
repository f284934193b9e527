use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Mobile Safari; product pages serve their lightest markup to phones
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

/// Configuration for the static HTTP tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Request timeout in seconds (default: 20)
    pub timeout_secs: u64,

    /// Maximum redirects followed per request (default: 10)
    pub max_redirects: usize,

    /// User agent string to use
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            max_redirects: 10,
            user_agent: MOBILE_USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = FetcherConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.contains("iPhone"));
    }
}
