//! Retry policy for the test client
//!
//! Fixed once the client is built: a retry budget, an exponential backoff
//! and the status codes that count as transient.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status codes the API suite treats as transient
pub const TRANSIENT_STATUS_CODES: &[u16] = &[429, 500, 502, 503, 504];

/// Retry and timeout configuration for an [`HttpClient`](super::HttpClient)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,

    /// Backoff factor; retry `n` waits `backoff_base * 2^(n-1)`, the first retry is immediate
    #[serde(with = "duration_ms", rename = "backoff_base_ms")]
    pub backoff_base: Duration,

    /// Upper bound for a single backoff sleep
    #[serde(with = "duration_ms", rename = "backoff_max_ms")]
    pub backoff_max: Duration,

    /// Response statuses that trigger a retry (idempotent methods only)
    pub retry_on_status: Vec<u16>,

    /// Per-request timeout
    #[serde(with = "duration_ms", rename = "timeout_ms")]
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::api()
    }
}

impl RetryPolicy {
    /// Policy for the API suite: 3 retries, factor 1s, transient 429/5xx, 10s timeout
    pub fn api() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            backoff_max: Duration::from_secs(120),
            retry_on_status: TRANSIENT_STATUS_CODES.to_vec(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Policy for the static site suite: connection-level retries only
    pub fn static_assets() -> Self {
        Self {
            retry_on_status: Vec::new(),
            ..Self::api()
        }
    }

    /// Policy that never retries
    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            retry_on_status: Vec::new(),
            ..Self::api()
        }
    }

    #[cfg(test)]
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    #[cfg(test)]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a response status should be retried
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    /// Sleep before the given 1-based retry
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(retry - 1);
        self.backoff_base
            .checked_mul(factor)
            .unwrap_or(self.backoff_max)
            .min(self.backoff_max)
    }
}

pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_policy() {
        let policy = RetryPolicy::api();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.timeout, Duration::from_secs(10));
        for status in [429, 500, 502, 503, 504] {
            assert!(policy.is_retryable_status(status));
        }
        assert!(!policy.is_retryable_status(400));
        assert!(!policy.is_retryable_status(501));
    }

    #[test]
    fn test_static_policy_has_no_status_retries() {
        let policy = RetryPolicy::static_assets();
        assert_eq!(policy.max_retries, 3);
        assert!(!policy.is_retryable_status(503));
    }

    #[test]
    fn test_backoff_growth() {
        let policy = RetryPolicy::api();
        assert_eq!(policy.backoff(1), Duration::ZERO);
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::api();
        assert_eq!(policy.backoff(30), Duration::from_secs(120));
    }

    #[test]
    fn test_policy_yaml_round_trip_uses_millis() {
        let yaml = serde_yaml::to_string(&RetryPolicy::api()).unwrap();
        assert!(yaml.contains("timeout_ms: 10000"));

        let parsed: RetryPolicy = serde_yaml::from_str("max_retries: 1\n").unwrap();
        assert_eq!(parsed.max_retries, 1);
        assert_eq!(parsed.timeout, Duration::from_secs(10));
    }
}
