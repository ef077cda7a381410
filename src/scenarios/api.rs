//! Email service API scenarios
//!
//! Health, login validation and latency checks against `BASE_URL`.

use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use super::assert::{expect_field_eq, expect_status, field, json_body};
use super::{to_result, AssertionFailure, Outcome, ScenarioOutcome};
use crate::http::{join_url, HttpClient, HttpResponse};
use crate::models::{Scenario, ScenarioCase, ScenarioResult};
use crate::utils::Timer;

pub const HEALTH_PATH: &str = "/api/health";
pub const LOGIN_PATH: &str = "/api/auth/login";

pub const DEFAULT_VALID_EMAILS: &[&str] = &["test@example.com", "user@domain.org"];

/// Empty, no `@`, empty local part, empty domain part
pub const DEFAULT_INVALID_EMAILS: &[&str] =
    &["invalid-email", "no-at-sign", "@domain.com", "user@", ""];

pub fn owned_emails(emails: &[&str]) -> Vec<String> {
    emails.iter().map(|s| s.to_string()).collect()
}

/// Scenarios run against the email service API
#[derive(Clone, Debug)]
pub struct ApiSuite {
    pub base_url: String,
    pub valid_emails: Vec<String>,
    pub invalid_emails: Vec<String>,
    pub latency_budget: Duration,
    pub health_repeats: u32,
}

impl ApiSuite {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            valid_emails: owned_emails(DEFAULT_VALID_EMAILS),
            invalid_emails: owned_emails(DEFAULT_INVALID_EMAILS),
            latency_budget: Duration::from_secs(2),
            health_repeats: 3,
        }
    }

    pub fn valid_emails(mut self, emails: Vec<String>) -> Self {
        self.valid_emails = emails;
        self
    }

    pub fn invalid_emails(mut self, emails: Vec<String>) -> Self {
        self.invalid_emails = emails;
        self
    }

    pub fn latency_budget(mut self, budget: Duration) -> Self {
        self.latency_budget = budget;
        self
    }

    /// Every case of the suite, login scenarios expanded per email
    pub fn cases(&self) -> Vec<ScenarioCase> {
        let mut cases = vec![ScenarioCase::new(Scenario::HealthCheck)];
        cases.extend(
            self.valid_emails
                .iter()
                .map(|email| ScenarioCase::with_param(Scenario::ValidLogin, email.clone())),
        );
        cases.extend(
            self.invalid_emails
                .iter()
                .map(|email| ScenarioCase::with_param(Scenario::InvalidLogin, email.clone())),
        );
        cases.push(ScenarioCase::new(Scenario::ApiLatency));
        cases.push(ScenarioCase::new(Scenario::HealthRepeatable));
        cases
    }

    pub async fn run_case(&self, client: &HttpClient, case: &ScenarioCase) -> ScenarioResult {
        info!("Running {}", case);
        let timer = Timer::start(case.label());
        let email = case.param.as_deref().unwrap_or_default();

        let outcome = match case.scenario {
            Scenario::HealthCheck => health_check(client, &self.base_url).await,
            Scenario::ValidLogin => login(client, &self.base_url, email, true).await,
            Scenario::InvalidLogin => login(client, &self.base_url, email, false).await,
            Scenario::ApiLatency => api_latency(client, &self.base_url, self.latency_budget).await,
            Scenario::HealthRepeatable => {
                health_repeatable(client, &self.base_url, self.health_repeats).await
            }
            other => Ok(Outcome::Skipped(format!("{other} is not an API scenario"))),
        };

        to_result(case, timer, outcome)
    }
}

fn check_health_body(response: &HttpResponse, input: &str) -> Result<(), AssertionFailure> {
    expect_status(response, 200, input)?;
    let body = json_body(response, input)?;
    expect_field_eq(&body, "status", &json!("Healthy"), input)?;
    field(&body, "timestamp", input)?;
    Ok(())
}

/// GET /api/health answers 200 `{"status": "Healthy", "timestamp": ..}`
pub async fn health_check(client: &HttpClient, base_url: &str) -> ScenarioOutcome {
    let response = client.get(&join_url(base_url, HEALTH_PATH)).await?;
    check_health_body(&response, &format!("GET {HEALTH_PATH}"))?;
    Ok(Outcome::Passed)
}

/// POST /api/auth/login: 200/`success: true` for valid emails, 400/`success: false` otherwise
pub async fn login(
    client: &HttpClient,
    base_url: &str,
    email: &str,
    expect_valid: bool,
) -> ScenarioOutcome {
    let input = format!("POST {LOGIN_PATH} email={email:?}");
    let payload = json!({ "email": email });
    let response = client
        .post_json(&join_url(base_url, LOGIN_PATH), &payload)
        .await?;

    let (status, success) = if expect_valid {
        (200, true)
    } else {
        (400, false)
    };
    expect_status(&response, status, &input)?;
    let body = json_body(&response, &input)?;
    expect_field_eq(&body, "success", &Value::Bool(success), &input)?;

    debug!("{} -> {}", input, response.status_code);
    Ok(Outcome::Passed)
}

/// GET /api/health completes within `budget`
pub async fn api_latency(client: &HttpClient, base_url: &str, budget: Duration) -> ScenarioOutcome {
    let input = format!("GET {HEALTH_PATH}");
    let timer = Timer::start("health latency");
    let response = client.get(&join_url(base_url, HEALTH_PATH)).await?;
    let elapsed = timer.elapsed();

    expect_status(&response, 200, &input)?;
    if elapsed >= budget {
        return Err(AssertionFailure::new(
            input,
            format!("response in under {:.2}s", budget.as_secs_f64()),
            format!("{:.2}s", elapsed.as_secs_f64()),
        )
        .into());
    }
    Ok(Outcome::Passed)
}

/// Repeated health checks all report healthy
pub async fn health_repeatable(
    client: &HttpClient,
    base_url: &str,
    repeats: u32,
) -> ScenarioOutcome {
    let url = join_url(base_url, HEALTH_PATH);
    for round in 1..=repeats {
        let response = client.get(&url).await?;
        let input = format!("GET {HEALTH_PATH} (call {round}/{repeats})");
        check_health_body(&response, &input)?;
    }
    Ok(Outcome::Passed)
}
