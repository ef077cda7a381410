//! End-to-end scenarios
//!
//! ## API suite
//! - Health Check
//! - Valid Login (one case per valid email)
//! - Invalid Login (one case per malformed email)
//! - API Latency
//! - Health Repeatable
//!
//! ## Frontend suite
//! - Index Page Loads
//! - Static Asset Caching
//! - HTML Cache Policy
//! - CDN Provenance
//!
//! Every scenario is an async function of the shared client, the suite's
//! base URL and an optional parameter. None of them retries its assertions;
//! only the client retries requests.

mod api;
mod assert;
mod assets;
mod frontend;

pub use api::{owned_emails, ApiSuite, DEFAULT_INVALID_EMAILS, DEFAULT_VALID_EMAILS};
pub use assert::AssertionFailure;
pub use frontend::FrontendSuite;

use thiserror::Error;

use crate::http::HttpError;
use crate::models::{ScenarioCase, ScenarioResult};
use crate::utils::Timer;

/// Non-failing outcome of a scenario
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Skipped(String),
}

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),

    #[error("request failed: {0}")]
    Transport(#[from] HttpError),
}

pub type ScenarioOutcome = Result<Outcome, ScenarioError>;

/// Turn a scenario outcome into a reportable result
pub(crate) fn to_result(
    case: &ScenarioCase,
    timer: Timer,
    outcome: ScenarioOutcome,
) -> ScenarioResult {
    let elapsed = timer.stop();
    let duration_ms = elapsed.as_millis() as u64;
    match outcome {
        Ok(Outcome::Passed) => ScenarioResult::pass(case, duration_ms),
        Ok(Outcome::Skipped(reason)) => ScenarioResult::skip(case, reason),
        Err(ScenarioError::Assertion(failure)) => {
            ScenarioResult::fail(case, duration_ms, failure.to_string())
        }
        Err(e @ ScenarioError::Transport(_)) => {
            ScenarioResult::error(case, duration_ms, e.to_string())
        }
    }
}
