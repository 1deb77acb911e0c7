//! Environment-driven configuration
//!
//! Credentials and endpoints for the remote advisory provider plus
//! cache TTLs. Everything has a default so the engine runs (in
//! fallback mode) with an empty environment.

use std::time::Duration;

/// Default TTL for cached advice composites (seconds)
pub const ADVICE_TTL_SECS: u64 = 300;

/// Default TTL for cached dashboard aggregates (seconds)
pub const DASHBOARD_TTL_SECS: u64 = 60;

/// Interval between background cache sweeps
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for the advisory gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// API key identifying this client to the provider. Empty means
    /// unconfigured: the gateway short-circuits to fallback synthesis.
    pub api_key: String,
    /// Shared HMAC secret. Empty means unconfigured.
    pub api_secret: String,
    pub host: String,
    pub path: String,
    pub model: String,
    pub timeout: Duration,
    /// When false, provider failures surface as UpstreamUnavailable
    /// instead of being absorbed into a synthesized narrative.
    pub fallback_enabled: bool,
}

impl GatewayConfig {
    /// Load from environment variables (call `dotenv::dotenv().ok()` first
    /// in the binary).
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("ADVISORY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(8);

        Self {
            api_key: std::env::var("ADVISORY_API_KEY").unwrap_or_default(),
            api_secret: std::env::var("ADVISORY_API_SECRET").unwrap_or_default(),
            host: std::env::var("ADVISORY_HOST")
                .unwrap_or_else(|_| "advisory.example.com".to_string()),
            path: std::env::var("ADVISORY_PATH")
                .unwrap_or_else(|_| "/v1/chat/completions".to_string()),
            model: std::env::var("ADVISORY_MODEL")
                .unwrap_or_else(|_| "advisor-large".to_string()),
            timeout: Duration::from_secs(timeout_secs),
            fallback_enabled: std::env::var("ADVISORY_FALLBACK_DISABLED").is_err(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    pub fn endpoint_url(&self) -> String {
        format!("https://{}{}", self.host, self.path)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            host: "advisory.example.com".to_string(),
            path: "/v1/chat/completions".to_string(),
            model: "advisor-large".to_string(),
            timeout: Duration::from_secs(8),
            fallback_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_credentials() {
        let cfg = GatewayConfig::default();
        assert!(!cfg.has_credentials());
        assert!(cfg.fallback_enabled);
    }

    #[test]
    fn test_endpoint_url() {
        let cfg = GatewayConfig {
            host: "api.test".to_string(),
            path: "/v1/advice".to_string(),
            ..GatewayConfig::default()
        };
        assert_eq!(cfg.endpoint_url(), "https://api.test/v1/advice");
    }
}
