//! Data models for the end-to-end suites
//!
//! Scenarios, their parameters, and the results a suite run produces.

mod result;
mod scenario;

pub use result::{ScenarioResult, ScenarioStatus, SuiteSummary};
pub use scenario::{Scenario, ScenarioCase, Suite};
