//! Configuration file management
//!
//! Handles finding, loading, and validating configuration files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::{EnvConfig, HarnessConfig};
use crate::http::RetryPolicy;
use crate::output::OutputFormat;

/// Configuration file locations (in order of precedence)
pub const CONFIG_LOCATIONS: &[&str] = &[
    "./email-e2e.yaml",
    "./email-e2e.yml",
    "./.email-e2e.yaml",
    "~/.config/email-e2e/config.yaml",
];

impl HarnessConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Resolve the effective configuration: an explicit file, then
    /// `E2E_CONFIG`, then the standard locations, with the environment on top
    pub fn resolve(explicit: Option<&Path>, env: &EnvConfig) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env.config_file.as_deref().map(expand_path));

        let mut config = match path {
            Some(path) => Self::load(&path)?,
            None => Self::load_default()?,
        };
        config.apply_env(env);
        Ok(config)
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration; run once every override has been applied
    pub fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_url("frontend.static_files_url", &self.frontend.static_files_url)?;

        for (name, readiness) in [
            ("api", &self.api.readiness),
            ("frontend", &self.frontend.readiness),
        ] {
            if readiness.max_attempts == 0 {
                anyhow::bail!("{name}.readiness.max_attempts must be at least 1");
            }
        }

        validate_timeout("api", &self.api.retry)?;
        validate_timeout("frontend", &self.frontend.retry)?;

        if self.api.latency_budget.is_zero() {
            anyhow::bail!("api.latency_budget_ms must be greater than 0");
        }

        if OutputFormat::from_str(&self.output.format).is_none() {
            anyhow::bail!(
                "Unknown output format: {} (table, json, json-pretty, csv, summary)",
                self.output.format
            );
        }

        Ok(())
    }

    /// Generate example configuration
    pub fn example() -> Self {
        let mut config = Self::default();
        config.api.base_url = "http://localhost:8080".to_string();
        config.api.readiness = config
            .api
            .readiness
            .clone()
            .max_attempts(15)
            .interval(Duration::from_secs(1));
        config.frontend.static_files_url = "https://d1234abcd.cloudfront.net".to_string();
        config
    }
}

fn validate_timeout(name: &str, retry: &RetryPolicy) -> Result<()> {
    if retry.timeout.is_zero() {
        anyhow::bail!("{name}.retry.timeout_ms must be greater than 0");
    }
    Ok(())
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty");
    }
    let parsed =
        url::Url::parse(value).with_context(|| format!("{name} is not a valid URL: {value}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("{name} must use http or https, got {}", parsed.scheme());
    }
    Ok(())
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        assert!(HarnessConfig::default().validate().is_ok());
        assert!(HarnessConfig::example().validate().is_ok());
    }

    #[test]
    fn test_config_file_save_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = HarnessConfig::example();
        config.save(&path).unwrap();

        let loaded = HarnessConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_file_save_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = HarnessConfig::example();
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"interval_ms\": 1000"));
        assert_eq!(HarnessConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = HarnessConfig::default();
        config.api.readiness.max_attempts = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = HarnessConfig::default();
        config.api.base_url = String::new();
        assert!(config.validate().is_err());

        let mut config = HarnessConfig::default();
        config.frontend.static_files_url = "ftp://files.example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = HarnessConfig::default();
        config.frontend.retry.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_format() {
        let mut config = HarnessConfig::default();
        config.output.format = "bogus".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Unknown output format: bogus"));

        config.output.format = "json-pretty".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_invalid_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "api: [not, a, map]").unwrap();

        let err = HarnessConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_resolve_explicit_file_then_env() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "api:\n  base_url: http://file:8080\nfrontend:\n  static_files_url: https://file.cdn\n",
        )
        .unwrap();
        let env = EnvConfig {
            base_url: Some("http://env:8080".to_string()),
            ..Default::default()
        };

        let config = HarnessConfig::resolve(Some(path.as_path()), &env).unwrap();

        assert_eq!(config.api.base_url, "http://env:8080");
        assert_eq!(config.frontend.static_files_url, "https://file.cdn");
    }

    #[test]
    fn test_resolve_defers_validation_to_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api:\n  base_url: http://file:8080\n").unwrap();
        let env = EnvConfig {
            base_url: Some("not-a-url".to_string()),
            format: Some("bogus".to_string()),
            ..Default::default()
        };

        let mut config = HarnessConfig::resolve(Some(path.as_path()), &env).unwrap();
        assert!(config.validate().is_err());

        config.api.base_url = "http://127.0.0.1:1".to_string();
        config.output.format = "table".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("./a.yaml"), PathBuf::from("./a.yaml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/x.yaml"), home.join("x.yaml"));
        }
    }
}
