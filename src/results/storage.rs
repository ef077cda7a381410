//! Results storage and retrieval
//!
//! Provides persistent storage for suite runs in JSON format.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::{Suite, SuiteSummary};

/// Stored suite run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredRun {
    /// Unique run ID
    pub id: String,

    pub suite: Suite,

    /// Base URL the suite ran against
    pub target: String,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,

    pub summary: SuiteSummary,

    /// Tool version
    pub tool_version: String,
}

impl StoredRun {
    /// Record a finished suite run
    pub fn new(started_at: DateTime<Utc>, summary: SuiteSummary) -> Self {
        Self {
            id: generate_run_id(),
            suite: summary.suite,
            target: summary.target.clone(),
            started_at,
            finished_at: Utc::now(),
            summary,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Generate unique run ID
fn generate_run_id() -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let random: u32 = rand::random::<u32>() % 10000;
    format!("{timestamp}_{random:04}")
}

/// Brief run information
#[derive(Clone, Debug)]
pub struct RunInfo {
    pub id: String,
    pub suite: Suite,
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub passed: usize,
    pub total: usize,
    pub pass_rate: f64,
}

impl From<&StoredRun> for RunInfo {
    fn from(run: &StoredRun) -> Self {
        Self {
            id: run.id.clone(),
            suite: run.suite,
            target: run.target.clone(),
            started_at: run.started_at,
            passed: run.summary.passed,
            total: run.summary.total,
            pass_rate: run.summary.pass_rate(),
        }
    }
}

/// Results storage manager
pub struct ResultsStorage {
    /// Base directory for results
    base_dir: PathBuf,
}

impl ResultsStorage {
    /// Create a new results storage
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create with default directory
    pub fn default_dir() -> Self {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("email-e2e")
            .join("results");
        Self::new(base_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn suite_dir(&self, suite: Suite) -> PathBuf {
        self.base_dir.join(suite.name())
    }

    fn run_path(&self, suite: Suite, run_id: &str) -> PathBuf {
        self.suite_dir(suite).join(format!("{run_id}.json"))
    }

    /// Save a run
    pub fn save(&self, run: &StoredRun) -> Result<PathBuf> {
        let suite_dir = self.suite_dir(run.suite);
        fs::create_dir_all(&suite_dir)
            .with_context(|| format!("Failed to create directory: {}", suite_dir.display()))?;

        let path = self.run_path(run.suite, &run.id);
        let file = File::create(&path).context("Failed to create results file")?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, run).context("Failed to write results")?;

        info!("Saved results to {}", path.display());
        Ok(path)
    }

    /// Load a run
    #[cfg(test)]
    pub fn load(&self, suite: Suite, run_id: &str) -> Result<StoredRun> {
        self.load_from_path(&self.run_path(suite, run_id))
    }

    /// Load from a specific path
    pub fn load_from_path(&self, path: &Path) -> Result<StoredRun> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open results file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse results: {}", path.display()))
    }

    /// All runs of a suite, newest first; unreadable files are skipped
    pub fn list_runs(&self, suite: Suite) -> Result<Vec<StoredRun>> {
        let suite_dir = self.suite_dir(suite);
        if !suite_dir.exists() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        for entry in fs::read_dir(&suite_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match self.load_from_path(&path) {
                    Ok(run) => runs.push(run),
                    Err(e) => debug!("Failed to load {}: {}", path.display(), e),
                }
            }
        }

        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(runs)
    }

    /// Get latest run of a suite
    pub fn latest(&self, suite: Suite) -> Result<Option<StoredRun>> {
        Ok(self.list_runs(suite)?.into_iter().next())
    }

    /// Export runs as one CSV row per scenario case
    pub fn export_csv(&self, runs: &[StoredRun], path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        writer.write_record([
            "run_id",
            "suite",
            "target",
            "started_at",
            "scenario",
            "param",
            "status",
            "duration_ms",
            "message",
        ])?;

        for run in runs {
            for result in &run.summary.results {
                writer.write_record([
                    run.id.clone(),
                    run.suite.name().to_string(),
                    run.target.clone(),
                    run.started_at.to_rfc3339(),
                    result.scenario.slug().to_string(),
                    result.param.clone().unwrap_or_default(),
                    result.status.to_string(),
                    result.duration_ms.to_string(),
                    result.message.clone().unwrap_or_default(),
                ])?;
            }
        }
        writer.flush()?;

        info!("Exported {} run(s) to {}", runs.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Scenario, ScenarioCase, ScenarioResult};
    use chrono::Duration;
    use tempfile::tempdir;

    fn run_started(minutes_ago: i64) -> StoredRun {
        let summary = SuiteSummary::new(
            Suite::Api,
            "http://frontend:8080",
            vec![
                ScenarioResult::pass(&ScenarioCase::new(Scenario::HealthCheck), 5),
                ScenarioResult::fail(
                    &ScenarioCase::with_param(Scenario::InvalidLogin, ""),
                    3,
                    "expected status 400, got status 200",
                ),
            ],
        );
        StoredRun::new(Utc::now() - Duration::minutes(minutes_ago), summary)
    }

    #[test]
    fn test_generate_run_id() {
        let id = generate_run_id();
        let parts: Vec<_> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path());
        let run = run_started(0);

        let path = storage.save(&run).unwrap();
        assert!(path.starts_with(dir.path().join("api")));

        let loaded = storage.load(Suite::Api, &run.id).unwrap();
        assert_eq!(loaded.id, run.id);
        assert_eq!(loaded.summary.failed, 1);
    }

    #[test]
    fn test_latest_is_newest_run() {
        let dir = tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path());
        let old = run_started(60);
        let new = run_started(1);
        storage.save(&old).unwrap();
        storage.save(&new).unwrap();
        fs::write(dir.path().join("api").join("junk.json"), "{").unwrap();

        let runs = storage.list_runs(Suite::Api).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id, new.id);
        assert_eq!(storage.latest(Suite::Api).unwrap().unwrap().id, new.id);
        assert!(storage.latest(Suite::Frontend).unwrap().is_none());
    }

    #[test]
    fn test_export_csv() {
        let dir = tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path());
        let run = run_started(0);
        let path = dir.path().join("export.csv");

        let runs = [run];
        storage.export_csv(&runs, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("run_id,suite,target"));
        assert!(lines[2].contains("login-invalid"));
        assert!(lines[2].contains(&runs[0].id));
    }
}
