//! Configuration module
//!
//! Suite targets, retry and readiness settings. Values come from built-in
//! defaults, then an optional YAML/JSON file, then environment variables,
//! then command-line flags.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};

use serde::{Deserialize, Serialize};

use crate::http::{duration_ms, RetryPolicy};
use crate::readiness::ReadinessConfig;
use crate::scenarios::{owned_emails, DEFAULT_INVALID_EMAILS, DEFAULT_VALID_EMAILS};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://frontend:8080";
pub const DEFAULT_STATIC_FILES_URL: &str = "https://localhost";

/// Complete harness configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub api: ApiConfig,
    pub frontend: FrontendConfig,
    pub output: OutputConfig,
}

/// API suite settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the email service API
    pub base_url: String,

    pub retry: RetryPolicy,

    pub readiness: ReadinessConfig,

    /// Gate the suite on the health endpoint
    pub wait_for_ready: bool,

    pub valid_emails: Vec<String>,

    pub invalid_emails: Vec<String>,

    /// Upper bound for the health check round trip
    #[serde(with = "duration_ms", rename = "latency_budget_ms")]
    pub latency_budget: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::api(),
            readiness: ReadinessConfig::default(),
            wait_for_ready: true,
            valid_emails: owned_emails(DEFAULT_VALID_EMAILS),
            invalid_emails: owned_emails(DEFAULT_INVALID_EMAILS),
            latency_budget: Duration::from_secs(2),
        }
    }
}

/// Static site suite settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Base URL of the CDN-fronted site
    pub static_files_url: String,

    pub retry: RetryPolicy,

    /// Accept invalid TLS certificates (self-signed local setups)
    pub tls_insecure: bool,

    /// Gate the suite on `readiness` against the site root
    pub wait_for_ready: bool,

    pub readiness: ReadinessConfig,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            static_files_url: DEFAULT_STATIC_FILES_URL.to_string(),
            retry: RetryPolicy::static_assets(),
            tls_insecure: false,
            wait_for_ready: false,
            readiness: ReadinessConfig::default().health_path("/"),
        }
    }
}

/// Report rendering settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// table, json, json-pretty, csv or summary
    pub format: String,

    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "table".to_string(),
            color: true,
        }
    }
}

impl HarnessConfig {
    /// Overlay values taken from the environment
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(url) = &env.base_url {
            self.api.base_url = url.clone();
        }
        if let Some(url) = &env.static_files_url {
            self.frontend.static_files_url = url.clone();
        }
        if let Some(insecure) = env.tls_insecure {
            self.frontend.tls_insecure = insecure;
        }
        if let Some(format) = &env.format {
            self.output.format = format.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.api.base_url, "http://frontend:8080");
        assert_eq!(config.frontend.static_files_url, "https://localhost");
        assert_eq!(config.api.retry, RetryPolicy::api());
        assert_eq!(config.frontend.retry, RetryPolicy::static_assets());
        assert!(config.api.wait_for_ready);
        assert!(!config.frontend.wait_for_ready);
        assert!(!config.frontend.tls_insecure);
    }

    #[test]
    fn test_env_overrides_config() {
        let mut config = HarnessConfig::default();
        let env = EnvConfig {
            base_url: Some("http://api.test:9000".to_string()),
            tls_insecure: Some(true),
            ..Default::default()
        };

        config.apply_env(&env);

        assert_eq!(config.api.base_url, "http://api.test:9000");
        assert_eq!(config.frontend.static_files_url, "https://localhost");
        assert!(config.frontend.tls_insecure);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "api:\n  base_url: http://staging:8080\n  readiness:\n    max_attempts: 5\n";
        let config: HarnessConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.api.base_url, "http://staging:8080");
        assert_eq!(config.api.readiness.max_attempts, 5);
        assert_eq!(config.api.readiness.interval, Duration::from_secs(2));
        assert_eq!(config.api.invalid_emails.len(), 5);
    }
}
