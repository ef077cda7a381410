//! Output formatters for suite results
//!
//! Provides Table, JSON, CSV, and summary output formats.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

use crate::models::{ScenarioResult, ScenarioStatus, SuiteSummary};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// One row of CSV output
#[derive(Serialize)]
struct CsvRow<'a> {
    suite: &'a str,
    scenario: &'a str,
    param: &'a str,
    status: String,
    duration_ms: u64,
    message: &'a str,
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colorize {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn status_label(&self, status: ScenarioStatus) -> String {
        match status {
            ScenarioStatus::Pass => self.paint("✓ PASS", "32"),
            ScenarioStatus::Fail => self.paint("✗ FAIL", "31"),
            ScenarioStatus::Skip => self.paint("○ SKIP", "33"),
            ScenarioStatus::Error => self.paint("! ERROR", "31"),
        }
    }

    /// Format a single scenario result
    pub fn format_result(&self, result: &ScenarioResult) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Table => self.format_result_table(result),
            OutputFormat::Json => serde_json::to_string(result)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(result)?,
            OutputFormat::Csv | OutputFormat::Summary => self.format_result_summary(result),
        })
    }

    fn format_result_table(&self, result: &ScenarioResult) -> String {
        let mut line = format!(
            "{:40} {} [{:>6}ms]",
            result.label(),
            self.status_label(result.status),
            result.duration_ms
        );
        if !result.status.is_success() {
            if let Some(message) = &result.message {
                line.push_str(&format!("\n      {message}"));
            }
        }
        line
    }

    fn format_result_summary(&self, result: &ScenarioResult) -> String {
        format!(
            "{} {} ({}ms)",
            result.status.symbol(),
            result.label(),
            result.duration_ms
        )
    }

    /// Format the summaries of one invocation
    pub fn format_summaries(&self, summaries: &[SuiteSummary]) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Table => summaries
                .iter()
                .map(|s| self.format_summary_table(s))
                .collect::<Result<Vec<_>>>()?
                .join("\n"),
            OutputFormat::Json => serde_json::to_string(summaries)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summaries)?,
            OutputFormat::Csv => self.format_csv(summaries)?,
            OutputFormat::Summary => summaries
                .iter()
                .map(|s| self.format_summary_brief(s))
                .collect::<Vec<_>>()
                .join("\n"),
        })
    }

    fn format_summary_table(&self, summary: &SuiteSummary) -> Result<String> {
        let rule = "═".repeat(64);
        let mut output = String::new();

        output.push_str(&format!("\n{rule}\n"));
        output.push_str(&format!(" {} suite - {}\n", summary.suite, summary.target));
        output.push_str(&format!("{rule}\n"));

        for result in &summary.results {
            output.push_str(&format!("  {}\n", self.format_result(result)?));
        }

        output.push_str(&format!("{rule}\n"));

        let pass_str = self.paint(&summary.passed.to_string(), "32");
        let fail_str = if summary.failed > 0 {
            self.paint(&summary.failed.to_string(), "31")
        } else {
            summary.failed.to_string()
        };

        output.push_str(&format!(
            " Total: {} | Pass: {} | Fail: {} | Skip: {} | Error: {}\n",
            summary.total, pass_str, fail_str, summary.skipped, summary.errors
        ));
        output.push_str(&format!(
            " Pass Rate: {:.1}% | Duration: {}ms\n",
            summary.pass_rate(),
            summary.total_duration_ms
        ));

        Ok(output)
    }

    fn format_csv(&self, summaries: &[SuiteSummary]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for summary in summaries {
            for result in &summary.results {
                writer.serialize(CsvRow {
                    suite: summary.suite.name(),
                    scenario: result.scenario.slug(),
                    param: result.param.as_deref().unwrap_or(""),
                    status: result.status.to_string(),
                    duration_ms: result.duration_ms,
                    message: result.message.as_deref().unwrap_or(""),
                })?;
            }
        }
        let bytes = writer.into_inner().context("Failed to flush CSV output")?;
        String::from_utf8(bytes).context("CSV output is not UTF-8")
    }

    fn format_summary_brief(&self, summary: &SuiteSummary) -> String {
        format!(
            "{} suite ({}): {}/{} passed, {} failed, {} errors, {} skipped in {}ms",
            summary.suite,
            summary.target,
            summary.passed,
            summary.total,
            summary.failed,
            summary.errors,
            summary.skipped,
            summary.total_duration_ms
        )
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Write formatted summaries to a file
pub fn write_results_to_file(
    path: &str,
    summaries: &[SuiteSummary],
    format: OutputFormat,
) -> Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_summaries(summaries)?;

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {path}"))?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Scenario, ScenarioCase, Suite};

    fn sample() -> SuiteSummary {
        SuiteSummary::new(
            Suite::Api,
            "http://frontend:8080",
            vec![
                ScenarioResult::pass(&ScenarioCase::new(Scenario::HealthCheck), 12),
                ScenarioResult::fail(
                    &ScenarioCase::with_param(Scenario::InvalidLogin, "user@"),
                    8,
                    "expected status 400, got status 200, \"quoted\"",
                ),
            ],
        )
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("unknown"), None);
    }

    #[test]
    fn test_formatter_creation() {
        let formatter = ResultFormatter::new(OutputFormat::Json).no_color();
        assert_eq!(formatter.format, OutputFormat::Json);
        assert!(!formatter.colorize);
    }

    #[test]
    fn test_table_shows_failure_message() {
        let output = ResultFormatter::default()
            .no_color()
            .format_summaries(&[sample()])
            .unwrap();
        assert!(output.contains("api suite - http://frontend:8080"));
        assert!(output.contains("✗ FAIL"));
        assert!(output.contains("expected status 400"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_csv_quotes_messages() {
        let output = ResultFormatter::new(OutputFormat::Csv)
            .format_summaries(&[sample()])
            .unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("suite,scenario,param,status,duration_ms,message")
        );
        assert_eq!(lines.next(), Some("api,health,,PASS,12,"));
        let failure = lines.next().unwrap();
        assert!(failure.starts_with("api,login-invalid,user@,FAIL,8,"));
        assert!(failure.contains("\"\"quoted\"\""));
    }

    #[test]
    fn test_json_is_an_array_of_summaries() {
        let output = ResultFormatter::new(OutputFormat::Json)
            .format_summaries(&[sample()])
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["failed"], 1);
        assert_eq!(value[0]["results"][1]["status"], "fail");
    }

    #[test]
    fn test_every_format_renders() {
        for format in [
            OutputFormat::Table,
            OutputFormat::Json,
            OutputFormat::JsonPretty,
            OutputFormat::Csv,
            OutputFormat::Summary,
        ] {
            let output = ResultFormatter::new(format)
                .no_color()
                .format_summaries(&[sample()])
                .unwrap();
            assert!(!output.is_empty(), "{format:?} rendered nothing");
        }
    }

    #[test]
    fn test_write_results_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        let err = write_results_to_file(path.to_str().unwrap(), &[sample()], OutputFormat::Csv)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to create output file"));
    }

    #[test]
    fn test_format_result_summary() {
        let result = ScenarioResult::pass(&ScenarioCase::new(Scenario::CdnProvenance), 100);
        let output = ResultFormatter::new(OutputFormat::Summary)
            .format_result(&result)
            .unwrap();
        assert!(output.contains("CDN"));
    }
}
