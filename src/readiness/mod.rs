//! Readiness gating
//!
//! Polls the service health endpoint once per suite before any scenario runs.

mod gate;

pub use gate::{ReadinessConfig, ReadinessError, ReadinessGate, Ready};
