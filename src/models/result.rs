//! Scenario result models
//!
//! Defines per-case outcomes and the per-suite summary.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Scenario, ScenarioCase, Suite};

/// Scenario execution status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Pass,
    /// An assertion did not hold
    Fail,
    Skip,
    /// The request itself failed after retries
    Error,
}

impl ScenarioStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            ScenarioStatus::Pass => "✓",
            ScenarioStatus::Fail => "✗",
            ScenarioStatus::Skip => "○",
            ScenarioStatus::Error => "!",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScenarioStatus::Pass)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ScenarioStatus::Fail | ScenarioStatus::Error)
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioStatus::Pass => write!(f, "PASS"),
            ScenarioStatus::Fail => write!(f, "FAIL"),
            ScenarioStatus::Skip => write!(f, "SKIP"),
            ScenarioStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of a single scenario case
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    pub param: Option<String>,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    pub message: Option<String>,
}

impl ScenarioResult {
    fn build(
        case: &ScenarioCase,
        status: ScenarioStatus,
        duration_ms: u64,
        message: Option<String>,
    ) -> Self {
        Self {
            scenario: case.scenario,
            param: case.param.clone(),
            status,
            duration_ms,
            message,
        }
    }

    pub fn pass(case: &ScenarioCase, duration_ms: u64) -> Self {
        Self::build(case, ScenarioStatus::Pass, duration_ms, None)
    }

    pub fn fail(case: &ScenarioCase, duration_ms: u64, message: impl Into<String>) -> Self {
        let message = Some(message.into());
        Self::build(case, ScenarioStatus::Fail, duration_ms, message)
    }

    pub fn skip(case: &ScenarioCase, reason: impl Into<String>) -> Self {
        Self::build(case, ScenarioStatus::Skip, 0, Some(reason.into()))
    }

    pub fn error(case: &ScenarioCase, duration_ms: u64, error: impl Into<String>) -> Self {
        Self::build(case, ScenarioStatus::Error, duration_ms, Some(error.into()))
    }

    pub fn label(&self) -> String {
        ScenarioCase {
            scenario: self.scenario,
            param: self.param.clone(),
        }
        .label()
    }
}

impl fmt::Display for ScenarioResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.status.symbol(),
            self.label(),
            self.duration_ms
        )?;
        if let Some(msg) = &self.message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

/// Summary of one suite run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub suite: Suite,
    pub target: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub total_duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteSummary {
    pub fn new(suite: Suite, target: impl Into<String>, results: Vec<ScenarioResult>) -> Self {
        let count = |status: ScenarioStatus| results.iter().filter(|r| r.status == status).count();
        let total = results.len();
        let passed = count(ScenarioStatus::Pass);
        let failed = count(ScenarioStatus::Fail);
        let skipped = count(ScenarioStatus::Skip);
        let errors = count(ScenarioStatus::Error);
        let total_duration_ms = results.iter().map(|r| r.duration_ms).sum();

        Self {
            suite,
            target: target.into(),
            total,
            passed,
            failed,
            skipped,
            errors,
            total_duration_ms,
            results,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        let executed = self.total - self.skipped;
        if executed == 0 {
            0.0
        } else {
            (self.passed as f64 / executed as f64) * 100.0
        }
    }

    /// No case failed or errored; skips are tolerated
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| r.status.is_failure())
    }
}

impl fmt::Display for SuiteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Suite {} - {}", self.suite, self.target)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Skip: {} | Error: {}",
            self.total, self.passed, self.failed, self.skipped, self.errors
        )?;
        writeln!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms",
            self.pass_rate(),
            self.total_duration_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_creation() {
        let case = ScenarioCase::new(Scenario::HealthCheck);
        let result = ScenarioResult::pass(&case, 100);
        assert!(result.status.is_success());
        assert_eq!(result.duration_ms, 100);
        assert!(result.message.is_none());
    }

    #[test]
    fn test_result_display_includes_param_and_message() {
        let case = ScenarioCase::with_param(Scenario::InvalidLogin, "user@");
        let result = ScenarioResult::fail(&case, 7, "expected status 400, got 200");
        let shown = result.to_string();
        assert!(shown.contains("Invalid Login [\"user@\"]"));
        assert!(shown.contains("expected status 400, got 200"));
    }

    #[test]
    fn test_suite_summary() {
        let results = vec![
            ScenarioResult::pass(&ScenarioCase::new(Scenario::IndexPage), 100),
            ScenarioResult::fail(&ScenarioCase::new(Scenario::HtmlCachePolicy), 50, "cached"),
            ScenarioResult::skip(&ScenarioCase::new(Scenario::StaticAssetCaching), "no asset"),
            ScenarioResult::error(&ScenarioCase::new(Scenario::CdnProvenance), 10, "refused"),
        ];

        let summary = SuiteSummary::new(Suite::Frontend, "https://localhost", results);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.total_duration_ms, 160);
        assert_eq!(summary.failures().count(), 2);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_skips_do_not_fail_suite() {
        let results = vec![
            ScenarioResult::pass(&ScenarioCase::new(Scenario::IndexPage), 1),
            ScenarioResult::skip(&ScenarioCase::new(Scenario::StaticAssetCaching), "no asset"),
        ];
        let summary = SuiteSummary::new(Suite::Frontend, "https://localhost", results);
        assert!(summary.is_success());
        assert_eq!(summary.pass_rate(), 100.0);
    }
}
