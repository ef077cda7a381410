//! Environment variable configuration
//!
//! `BASE_URL` and `STATIC_FILES_URL` keep the names the deployment pipeline
//! already exports; harness-specific switches use the `E2E_` prefix.

use std::env;

/// Prefix for harness-specific variables
const ENV_PREFIX: &str = "E2E";

pub const BASE_URL_VAR: &str = "BASE_URL";
pub const STATIC_FILES_URL_VAR: &str = "STATIC_FILES_URL";

/// Configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// API base URL from BASE_URL
    pub base_url: Option<String>,
    /// Static site URL from STATIC_FILES_URL
    pub static_files_url: Option<String>,
    /// Accept invalid certificates, from E2E_TLS_INSECURE
    pub tls_insecure: Option<bool>,
    /// Config file from E2E_CONFIG
    pub config_file: Option<String>,
    /// Output format from E2E_FORMAT
    pub format: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            base_url: non_empty(env::var(BASE_URL_VAR).ok()),
            static_files_url: non_empty(env::var(STATIC_FILES_URL_VAR).ok()),
            tls_insecure: get_env_bool("TLS_INSECURE"),
            config_file: get_env("CONFIG"),
            format: get_env("FORMAT"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.base_url.is_some()
            || self.static_files_url.is_some()
            || self.tls_insecure.is_some()
            || self.config_file.is_some()
            || self.format.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {BASE_URL_VAR}:            {:?}", self.base_url);
        println!("  {STATIC_FILES_URL_VAR}:    {:?}", self.static_files_url);
        println!("  {ENV_PREFIX}_TLS_INSECURE:    {:?}", self.tls_insecure);
        println!("  {ENV_PREFIX}_CONFIG:          {:?}", self.config_file);
        println!("  {ENV_PREFIX}_FORMAT:          {:?}", self.format);
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    non_empty(env::var(format!("{ENV_PREFIX}_{name}")).ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables in tests
#[cfg(test)]
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

#[cfg(test)]
impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    fn set(mut self, key: String, value: String) -> Self {
        self.vars.push((key, value));
        self
    }

    pub fn base_url(self, url: impl Into<String>) -> Self {
        self.set(BASE_URL_VAR.to_string(), url.into())
    }

    pub fn static_files_url(self, url: impl Into<String>) -> Self {
        self.set(STATIC_FILES_URL_VAR.to_string(), url.into())
    }

    pub fn tls_insecure(self, insecure: bool) -> Self {
        self.set(format!("{ENV_PREFIX}_TLS_INSECURE"), insecure.to_string())
    }

    pub fn config_file(self, path: impl Into<String>) -> Self {
        self.set(format!("{ENV_PREFIX}_CONFIG"), path.into())
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        for (key, value) in self.vars {
            env::set_var(key, value);
        }

        EnvGuard { previous }
    }
}

/// Guard that restores environment variables on drop
#[cfg(test)]
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

#[cfg(test)]
impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print the variables the harness reads
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {BASE_URL_VAR}              API base URL (default http://frontend:8080)");
    println!("  {STATIC_FILES_URL_VAR}      Static site base URL (default https://localhost)");
    println!("  {ENV_PREFIX}_TLS_INSECURE      Accept invalid TLS certificates (true/false)");
    println!("  {ENV_PREFIX}_CONFIG            Path to configuration file");
    println!("  {ENV_PREFIX}_FORMAT            Output format (table, json, csv, summary)");
    println!("  RUST_LOG              Log filter, overrides --verbose");
    println!();
    println!("Example:");
    println!("  export {BASE_URL_VAR}=http://localhost:8080");
    println!("  export {STATIC_FILES_URL_VAR}=https://d1234.cloudfront.net");
    println!("  email-e2e all");
}
