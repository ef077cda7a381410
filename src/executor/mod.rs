//! Suite execution engine
//!
//! Each suite runs its cases sequentially behind an optional readiness gate.

mod runner;

pub use runner::{CaseFilter, RunError, SuiteRunner};
