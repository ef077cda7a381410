//! Health-endpoint readiness gate
//!
//! A suite holds a [`Ready`] token only after the target answered its health
//! endpoint with 200. Transport errors and other statuses while polling mean
//! "not ready yet"; only running out of attempts is fatal.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::http::{duration_ms, join_url, HttpClient};

/// Readiness gate configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Polls before giving up
    pub max_attempts: u32,

    /// Pause between polls
    #[serde(with = "duration_ms", rename = "interval_ms")]
    pub interval: Duration,

    /// Health endpoint path
    pub health_path: String,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(2),
            health_path: "/api/health".to_string(),
        }
    }
}

impl ReadinessConfig {
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }
}

/// Proof that the target answered its health endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ready {
    pub attempts: u32,
    pub elapsed: Duration,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReadinessError {
    #[error(
        "service failed to start within timeout: {url} not healthy after {attempts} attempts ({}s), last: {last_observation}",
        .elapsed.as_secs()
    )]
    Timeout {
        url: String,
        attempts: u32,
        elapsed: Duration,
        last_observation: String,
    },
}

/// Polls `{base_url}{health_path}` until it answers 200
pub struct ReadinessGate {
    config: ReadinessConfig,
}

impl ReadinessGate {
    pub fn new(config: ReadinessConfig) -> Self {
        Self { config }
    }

    /// Block until the service is healthy or the attempt budget is spent
    pub async fn wait(&self, client: &HttpClient, base_url: &str) -> Result<Ready, ReadinessError> {
        let url = join_url(base_url, &self.config.health_path);
        let start = Instant::now();
        let mut last_observation = String::from("no attempt made");

        info!(
            "Waiting for {} (up to {} attempts, {}ms apart)",
            url,
            self.config.max_attempts,
            self.config.interval.as_millis()
        );

        for attempt in 1..=self.config.max_attempts {
            match client.get(&url).await {
                Ok(response) if response.status_code == 200 => {
                    let ready = Ready {
                        attempts: attempt,
                        elapsed: start.elapsed(),
                    };
                    info!(
                        "Service ready after {} attempt(s) in {}ms",
                        ready.attempts,
                        ready.elapsed.as_millis()
                    );
                    return Ok(ready);
                }
                Ok(response) => {
                    debug!("Attempt {}: status {}", attempt, response.status_code);
                    last_observation = format!("status {}", response.status_code);
                }
                Err(e) => {
                    debug!("Attempt {}: {}", attempt, e);
                    last_observation = e.to_string();
                }
            }

            if attempt < self.config.max_attempts {
                sleep(self.config.interval).await;
            }
        }

        let err = ReadinessError::Timeout {
            url,
            attempts: self.config.max_attempts,
            elapsed: start.elapsed(),
            last_observation,
        };
        warn!("{}", err);
        Err(err)
    }
}
