//! Static site scenarios
//!
//! Page delivery, cache headers and CDN provenance against `STATIC_FILES_URL`.

use tracing::{debug, info};

use super::assert::{expect_header_contains_any, expect_status};
use super::assets::{first_static_asset, resolve_asset_url};
use super::{to_result, AssertionFailure, Outcome, ScenarioOutcome};
use crate::http::{join_url, HttpClient};
use crate::models::{Scenario, ScenarioCase, ScenarioResult};
use crate::utils::Timer;

/// Headers a CDN hop adds to its responses
pub const PROVENANCE_HEADERS: &[&str] = &["x-cache", "via", "x-amz-cf-id"];

/// Scenarios run against the CDN-fronted static site
#[derive(Clone, Debug)]
pub struct FrontendSuite {
    pub base_url: String,
}

impl FrontendSuite {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn cases(&self) -> Vec<ScenarioCase> {
        [
            Scenario::IndexPage,
            Scenario::StaticAssetCaching,
            Scenario::HtmlCachePolicy,
            Scenario::CdnProvenance,
        ]
        .into_iter()
        .map(ScenarioCase::new)
        .collect()
    }

    pub async fn run_case(&self, client: &HttpClient, case: &ScenarioCase) -> ScenarioResult {
        info!("Running {}", case);
        let timer = Timer::start(case.label());

        let outcome = match case.scenario {
            Scenario::IndexPage => index_page(client, &self.base_url).await,
            Scenario::StaticAssetCaching => static_asset_caching(client, &self.base_url).await,
            Scenario::HtmlCachePolicy => html_cache_policy(client, &self.base_url).await,
            Scenario::CdnProvenance => cdn_provenance(client, &self.base_url).await,
            other => Ok(Outcome::Skipped(format!("{other} is not a frontend scenario"))),
        };

        to_result(case, timer, outcome)
    }
}

/// GET / is an HTML page with a title
pub async fn index_page(client: &HttpClient, base_url: &str) -> ScenarioOutcome {
    let input = "GET /";
    let response = client.get(&join_url(base_url, "/")).await?;

    expect_status(&response, 200, input)?;
    let content_type = response
        .get_header("content-type")
        .cloned()
        .unwrap_or_default();
    if !content_type.contains("text/html") {
        return Err(AssertionFailure::new(
            input,
            "content-type containing \"text/html\"",
            format!("content-type {content_type:?}"),
        )
        .into());
    }
    if !response.body_contains("<title>") {
        let failure = AssertionFailure::new(input, "a <title> in the body", "no <title>")
            .with_body(&response.body);
        return Err(failure.into());
    }
    Ok(Outcome::Passed)
}

/// The first script or stylesheet the index references carries a `max-age`
pub async fn static_asset_caching(client: &HttpClient, base_url: &str) -> ScenarioOutcome {
    let index = client.get(&join_url(base_url, "/")).await?;
    let Some(reference) = first_static_asset(&index.body) else {
        let reason = "no static asset referenced by the index page";
        return Ok(Outcome::Skipped(reason.to_string()));
    };

    let asset_url = resolve_asset_url(base_url, reference).map_err(|e| {
        AssertionFailure::new(
            format!("asset reference {reference:?}"),
            "a resolvable URL",
            e.to_string(),
        )
    })?;
    debug!("Checking cache headers of {}", asset_url);

    let input = format!("GET {asset_url}");
    let response = client.get(&asset_url).await?;
    expect_status(&response, 200, &input)?;
    expect_header_contains_any(&response, "cache-control", &["max-age"], &input)?;
    Ok(Outcome::Passed)
}

/// The HTML document is not cached aggressively
pub async fn html_cache_policy(client: &HttpClient, base_url: &str) -> ScenarioOutcome {
    let response = client.get(&join_url(base_url, "/")).await?;
    let fresh = ["no-cache", "max-age=0"];
    expect_header_contains_any(&response, "cache-control", &fresh, "GET /")?;
    Ok(Outcome::Passed)
}

/// The response passed through the CDN
pub async fn cdn_provenance(client: &HttpClient, base_url: &str) -> ScenarioOutcome {
    let response = client.get(&join_url(base_url, "/")).await?;
    if PROVENANCE_HEADERS.iter().any(|h| response.has_header(h)) {
        return Ok(Outcome::Passed);
    }
    Err(AssertionFailure::new(
        "GET /",
        format!("one of the headers {}", PROVENANCE_HEADERS.join(", ")),
        "none present",
    )
    .into())
}
