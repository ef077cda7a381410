//! Suite execution runner
//!
//! Builds the suite's client, gates on readiness and runs the cases in order.

use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ApiConfig, FrontendConfig};
use crate::http::{HttpClient, HttpError, TlsPolicy};
use crate::models::{Scenario, ScenarioCase, ScenarioResult, Suite, SuiteSummary};
use crate::readiness::{ReadinessError, ReadinessGate, Ready};
use crate::scenarios::{ApiSuite, FrontendSuite};

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    NotReady(#[from] ReadinessError),

    #[error(transparent)]
    Client(#[from] HttpError),

    #[error("unknown scenario '{0}' (see `email-e2e list`)")]
    UnknownScenario(String),
}

/// `--only` / `--skip` selection by scenario slug
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaseFilter {
    only: Vec<Scenario>,
    skip: Vec<Scenario>,
}

impl CaseFilter {
    pub fn parse(only: &[String], skip: &[String]) -> Result<Self, RunError> {
        Ok(Self {
            only: parse_slugs(only)?,
            skip: parse_slugs(skip)?,
        })
    }

    pub fn allows(&self, scenario: Scenario) -> bool {
        (self.only.is_empty() || self.only.contains(&scenario)) && !self.skip.contains(&scenario)
    }
}

fn parse_slugs(slugs: &[String]) -> Result<Vec<Scenario>, RunError> {
    slugs
        .iter()
        .flat_map(|s| s.split(','))
        .filter(|s| !s.trim().is_empty())
        .map(parse_slug)
        .collect()
}

fn parse_slug(slug: &str) -> Result<Scenario, RunError> {
    match Scenario::from_slug(slug) {
        Some(scenario) => Ok(scenario),
        None => Err(RunError::UnknownScenario(slug.to_string())),
    }
}

/// Permission to run a suite's cases, handed out by [`SuiteRunner::wait_ready`]
///
/// Carries the [`Ready`] token when the runner is gated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Admission(Option<Ready>);

impl Admission {
    pub fn ready(&self) -> Option<&Ready> {
        self.0.as_ref()
    }
}

enum SuitePlan {
    Api(ApiSuite),
    Frontend(FrontendSuite),
}

/// Runs one suite against its target
pub struct SuiteRunner {
    plan: SuitePlan,
    client: HttpClient,
    readiness: Option<ReadinessGate>,
    filter: CaseFilter,
}

impl SuiteRunner {
    /// Runner for the email service API
    pub fn api(config: &ApiConfig) -> Result<Self, RunError> {
        let suite = ApiSuite::new(&config.base_url)
            .valid_emails(config.valid_emails.clone())
            .invalid_emails(config.invalid_emails.clone())
            .latency_budget(config.latency_budget);

        Ok(Self {
            plan: SuitePlan::Api(suite),
            client: HttpClient::new(config.retry.clone())?,
            readiness: config
                .wait_for_ready
                .then(|| ReadinessGate::new(config.readiness.clone())),
            filter: CaseFilter::default(),
        })
    }

    /// Runner for the CDN-fronted static site
    pub fn frontend(config: &FrontendConfig) -> Result<Self, RunError> {
        let tls = TlsPolicy::from_insecure(config.tls_insecure);

        Ok(Self {
            plan: SuitePlan::Frontend(FrontendSuite::new(&config.static_files_url)),
            client: HttpClient::with_tls(config.retry.clone(), tls)?,
            readiness: config
                .wait_for_ready
                .then(|| ReadinessGate::new(config.readiness.clone())),
            filter: CaseFilter::default(),
        })
    }

    pub fn with_filter(mut self, filter: CaseFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn suite(&self) -> Suite {
        match self.plan {
            SuitePlan::Api(_) => Suite::Api,
            SuitePlan::Frontend(_) => Suite::Frontend,
        }
    }

    pub fn base_url(&self) -> &str {
        match &self.plan {
            SuitePlan::Api(suite) => &suite.base_url,
            SuitePlan::Frontend(suite) => &suite.base_url,
        }
    }

    /// Every case of the suite, before filtering
    pub fn cases(&self) -> Vec<ScenarioCase> {
        match &self.plan {
            SuitePlan::Api(suite) => suite.cases(),
            SuitePlan::Frontend(suite) => suite.cases(),
        }
    }

    /// Run the readiness gate, if this runner has one
    pub async fn wait_ready(&self) -> Result<Admission, RunError> {
        match &self.readiness {
            Some(gate) => {
                let ready = gate.wait(&self.client, self.base_url()).await?;
                Ok(Admission(Some(ready)))
            }
            None => Ok(Admission(None)),
        }
    }

    async fn run_case(&self, case: &ScenarioCase) -> ScenarioResult {
        if !self.filter.allows(case.scenario) {
            return ScenarioResult::skip(case, "Skipped by --only/--skip");
        }
        match &self.plan {
            SuitePlan::Api(suite) => suite.run_case(&self.client, case).await,
            SuitePlan::Frontend(suite) => suite.run_case(&self.client, case).await,
        }
    }

    /// Run every case in order; an [`Admission`] only comes from the gate step
    async fn run_cases(&self, admission: &Admission) -> Vec<ScenarioResult> {
        match admission.ready() {
            Some(ready) => debug!(
                "Admitted after {} health poll(s) in {}ms",
                ready.attempts,
                ready.elapsed.as_millis()
            ),
            None => debug!("Running {} suite without a readiness gate", self.suite()),
        }

        let mut results = Vec::new();
        for case in self.cases() {
            let result = self.run_case(&case).await;
            info!("  {}", result);
            results.push(result);
        }
        results
    }

    /// Gate on readiness, then run every case sequentially
    pub async fn run(&self) -> Result<SuiteSummary, RunError> {
        info!(
            "Starting {} suite against {}",
            self.suite(),
            self.base_url()
        );
        let start = Instant::now();

        let admission = self.wait_ready().await?;
        let results = self.run_cases(&admission).await;
        let summary = SuiteSummary::new(self.suite(), self.base_url(), results);

        info!(
            "{} suite completed in {}ms - Pass: {}/{} ({:.1}%)",
            self.suite(),
            start.elapsed().as_millis(),
            summary.passed,
            summary.total,
            summary.pass_rate()
        );

        Ok(summary)
    }
}
