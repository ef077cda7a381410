//! Scenario catalogue
//!
//! Every check the harness knows about, grouped by the suite that owns it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A group of scenarios sharing one client and one base URL
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suite {
    /// Email service HTTP API
    Api,
    /// Static site behind the CDN
    Frontend,
}

impl Suite {
    pub fn name(&self) -> &'static str {
        match self {
            Suite::Api => "api",
            Suite::Frontend => "frontend",
        }
    }

    pub fn all() -> Vec<Suite> {
        vec![Suite::Api, Suite::Frontend]
    }

    pub fn from_name(name: &str) -> Option<Suite> {
        let name = name.trim().to_lowercase();
        Suite::all().into_iter().find(|s| s.name() == name)
    }

    pub fn scenarios(&self) -> Vec<Scenario> {
        Scenario::all()
            .into_iter()
            .filter(|s| s.suite() == *self)
            .collect()
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Individual checks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    // API suite
    HealthCheck,
    ValidLogin,
    InvalidLogin,
    ApiLatency,
    HealthRepeatable,

    // Frontend suite
    IndexPage,
    StaticAssetCaching,
    HtmlCachePolicy,
    CdnProvenance,
}

impl Scenario {
    /// Stable identifier used on the command line
    pub fn slug(&self) -> &'static str {
        match self {
            Scenario::HealthCheck => "health",
            Scenario::ValidLogin => "login-valid",
            Scenario::InvalidLogin => "login-invalid",
            Scenario::ApiLatency => "latency",
            Scenario::HealthRepeatable => "health-repeat",
            Scenario::IndexPage => "index",
            Scenario::StaticAssetCaching => "asset-cache",
            Scenario::HtmlCachePolicy => "html-cache",
            Scenario::CdnProvenance => "cdn",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::HealthCheck => "Health Check",
            Scenario::ValidLogin => "Valid Login",
            Scenario::InvalidLogin => "Invalid Login",
            Scenario::ApiLatency => "API Latency",
            Scenario::HealthRepeatable => "Health Repeatable",
            Scenario::IndexPage => "Index Page Loads",
            Scenario::StaticAssetCaching => "Static Asset Caching",
            Scenario::HtmlCachePolicy => "HTML Cache Policy",
            Scenario::CdnProvenance => "CDN Provenance",
        }
    }

    pub fn suite(&self) -> Suite {
        match self {
            Scenario::HealthCheck
            | Scenario::ValidLogin
            | Scenario::InvalidLogin
            | Scenario::ApiLatency
            | Scenario::HealthRepeatable => Suite::Api,
            _ => Suite::Frontend,
        }
    }

    /// Whether the scenario runs once per email parameter
    pub fn is_parameterized(&self) -> bool {
        matches!(self, Scenario::ValidLogin | Scenario::InvalidLogin)
    }

    pub fn all() -> Vec<Scenario> {
        vec![
            Scenario::HealthCheck,
            Scenario::ValidLogin,
            Scenario::InvalidLogin,
            Scenario::ApiLatency,
            Scenario::HealthRepeatable,
            Scenario::IndexPage,
            Scenario::StaticAssetCaching,
            Scenario::HtmlCachePolicy,
            Scenario::CdnProvenance,
        ]
    }

    pub fn from_slug(slug: &str) -> Option<Scenario> {
        let slug = slug.trim().to_lowercase();
        Scenario::all().into_iter().find(|s| s.slug() == slug)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A scenario bound to its parameter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioCase {
    pub scenario: Scenario,
    pub param: Option<String>,
}

impl ScenarioCase {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            param: None,
        }
    }

    pub fn with_param(scenario: Scenario, param: impl Into<String>) -> Self {
        Self {
            scenario,
            param: Some(param.into()),
        }
    }

    /// Display label, e.g. `Invalid Login [""]`
    pub fn label(&self) -> String {
        match &self.param {
            Some(param) => format!("{} [{param:?}]", self.scenario.name()),
            None => self.scenario.name().to_string(),
        }
    }
}

impl fmt::Display for ScenarioCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
