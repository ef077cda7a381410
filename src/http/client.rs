//! HTTP client for end-to-end checks
//!
//! Wraps a reqwest client with a fixed [`RetryPolicy`] so that scenarios see
//! transient failures only once the retry budget is spent.

use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::retry::RetryPolicy;

/// HTTP client errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Connection refused to {0}")]
    ConnectionRefused(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Failed to create HTTP client: {0}")]
    Build(String),
}

impl HttpError {
    /// Whether the error may clear up on a later attempt
    fn is_transient(&self, idempotent: bool) -> bool {
        match self {
            // Nothing reached the server, safe to replay any method
            HttpError::ConnectionRefused(_) => true,
            HttpError::Timeout(_) | HttpError::RequestFailed(_) => idempotent,
            _ => false,
        }
    }
}

/// Certificate verification policy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsPolicy {
    #[default]
    Verify,
    /// Accept self-signed and otherwise invalid certificates
    AcceptInvalid,
}

impl TlsPolicy {
    pub fn from_insecure(insecure: bool) -> Self {
        if insecure {
            TlsPolicy::AcceptInvalid
        } else {
            TlsPolicy::Verify
        }
    }
}

/// HTTP client with a fixed retry policy
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Create a client with the given retry policy
    pub fn new(policy: RetryPolicy) -> Result<Self, HttpError> {
        Self::with_tls(policy, TlsPolicy::Verify)
    }

    /// Create a client with an explicit certificate policy
    pub fn with_tls(policy: RetryPolicy, tls: TlsPolicy) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(policy.timeout)
            .danger_accept_invalid_certs(tls == TlsPolicy::AcceptInvalid)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(Self { client, policy })
    }

    /// Send a request, retrying transient failures per the policy
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| HttpError::InvalidMethod(request.method.clone()))?;
        let idempotent = is_idempotent(&method);
        let mut retry = 0u32;

        loop {
            match self.send_once(&method, &request).await {
                Ok(response)
                    if idempotent
                        && self.policy.is_retryable_status(response.status_code)
                        && retry < self.policy.max_retries =>
                {
                    retry += 1;
                    let delay = self.policy.backoff(retry);
                    warn!(
                        "{} {} returned {}, retry {}/{} in {}ms",
                        method,
                        request.url,
                        response.status_code,
                        retry,
                        self.policy.max_retries,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                }
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient(idempotent) && retry < self.policy.max_retries => {
                    retry += 1;
                    let delay = self.policy.backoff(retry);
                    warn!(
                        "{} {} failed: {}, retry {}/{} in {}ms",
                        method,
                        request.url,
                        e,
                        retry,
                        self.policy.max_retries,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        method: &Method,
        request: &HttpRequest,
    ) -> Result<HttpResponse, HttpError> {
        debug!("Sending {} request to {}", method, request.url);

        let mut req_builder = self.client.request(method.clone(), &request.url);

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        let start = Instant::now();

        let response = req_builder
            .send()
            .await
            .map_err(|e| self.classify(e, &request.url))?;

        let status = response.status();

        let mut headers: HashMap<String, String> = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers
                    .entry(key.as_str().to_string())
                    .and_modify(|existing| {
                        existing.push_str(", ");
                        existing.push_str(v);
                    })
                    .or_insert_with(|| v.to_string());
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.classify(e, &request.url))?;

        let duration_ms = start.elapsed().as_millis() as u64;

        debug!(
            "Response: {} {} in {}ms",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            duration_ms
        );

        Ok(HttpResponse {
            status_code: status.as_u16(),
            headers,
            body,
            duration_ms,
        })
    }

    fn classify(&self, e: reqwest::Error, url: &str) -> HttpError {
        if e.is_builder() {
            HttpError::InvalidUrl(url.to_string())
        } else if e.is_timeout() {
            HttpError::Timeout(self.policy.timeout.as_millis() as u64)
        } else if e.is_connect() {
            HttpError::ConnectionRefused(url.to_string())
        } else {
            HttpError::RequestFailed(e.to_string())
        }
    }

    /// Convenience method for GET request
    pub async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.send(HttpRequest::get(url)).await
    }

    /// POST a JSON document
    pub async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, HttpError> {
        self.send(HttpRequest::post(url).json(body)).await
    }
}

fn is_idempotent(method: &Method) -> bool {
    [
        Method::GET,
        Method::HEAD,
        Method::OPTIONS,
        Method::PUT,
        Method::DELETE,
        Method::TRACE,
    ]
    .contains(method)
}

/// Join a base URL and an absolute path
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}{}", base.trim_end_matches('/'), path)
    }
}

/// HTTP request builder
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn json(self, value: &serde_json::Value) -> Self {
        let body = value.to_string();
        self.header("Content-Type", "application/json").body(body)
    }
}

/// HTTP response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status_code: u16,
    /// Header names are lower-case; repeated headers are comma-joined
    pub headers: HashMap<String, String>,
    pub body: String,
    pub duration_ms: u64,
}

impl HttpResponse {
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_lowercase())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// Case-insensitive substring match on a header value; absent header never matches
    pub fn header_contains_ci(&self, name: &str, needle: &str) -> bool {
        self.get_header(name)
            .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false)
    }

    pub fn body_contains(&self, text: &str) -> bool {
        self.body.contains(text)
    }

    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closed_port_url, spawn};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tracing::instrument::WithSubscriber;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Counts the warnings this module logs, one per scheduled retry
    struct RetryWarnings(Arc<AtomicU32>);

    impl<S: tracing::Subscriber> Layer<S> for RetryWarnings {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let meta = event.metadata();
            if *meta.level() == tracing::Level::WARN
                && meta.target().starts_with("email_e2e::http")
            {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::api().with_backoff_base(Duration::from_millis(1))
    }

    /// Answers 503 for the first `failures` calls, then 200
    fn flapping(failures: u32, hits: Arc<AtomicU32>) -> Router {
        let handler = move || {
            let hits = hits.clone();
            async move {
                let n = hits.fetch_add(1, Ordering::SeqCst);
                if n < failures {
                    (StatusCode::SERVICE_UNAVAILABLE, "down")
                } else {
                    (StatusCode::OK, "up")
                }
            }
        };
        Router::new().route("/flap", get(handler.clone()).post(handler))
    }

    #[test]
    fn test_http_request_builder() {
        let req = HttpRequest::post("http://example.com/api")
            .json(&serde_json::json!({"email": "a@b.c"}))
            .header("X-Custom", "value");

        assert_eq!(req.method, "POST");
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.body.as_deref(), Some(r#"{"email":"a@b.c"}"#));
    }

    #[test]
    fn test_http_response_headers() {
        let mut headers = HashMap::new();
        headers.insert(
            "cache-control".to_string(),
            "Public, MAX-AGE=31536000".to_string(),
        );
        let resp = HttpResponse {
            status_code: 200,
            headers,
            body: "<title>x</title>".to_string(),
            duration_ms: 12,
        };

        assert!(resp.has_header("Cache-Control"));
        assert!(resp.header_contains_ci("cache-control", "max-age"));
        assert!(!resp.header_contains_ci("x-cache", "hit"));
        assert!(resp.body_contains("<title>"));
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://svc:8080/", "/api/health"),
            "http://svc:8080/api/health"
        );
        assert_eq!(join_url("http://svc", "https://cdn/a.js"), "https://cdn/a.js");
    }

    #[tokio::test]
    async fn test_retries_transient_status_until_success() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = spawn(flapping(2, hits.clone())).await;
        let client = HttpClient::new(fast_policy()).unwrap();

        let resp = client.get(&format!("{base}/flap")).await.unwrap();

        assert_eq!(resp.status_code, 200);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_status_retries_return_last_response() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = spawn(flapping(100, hits.clone())).await;
        let client = HttpClient::new(fast_policy()).unwrap();

        let resp = client.get(&format!("{base}/flap")).await.unwrap();

        assert_eq!(resp.status_code, 503);
        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_post_is_not_retried_on_status() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = spawn(flapping(1, hits.clone())).await;
        let client = HttpClient::new(fast_policy()).unwrap();

        let resp = client
            .post_json(&format!("{base}/flap"), &serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(resp.status_code, 503);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_static_policy_ignores_status() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = spawn(flapping(1, hits.clone())).await;
        let client = HttpClient::new(RetryPolicy::static_assets()).unwrap();

        let resp = client.get(&format!("{base}/flap")).await.unwrap();

        assert_eq!(resp.status_code, 503);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connection_refused_surfaces_after_retries() {
        let base = closed_port_url();

        let client = HttpClient::new(fast_policy()).unwrap();
        let err = client.get(&format!("{base}/")).await.unwrap_err();

        assert!(matches!(err, HttpError::ConnectionRefused(_)));
    }

    #[tokio::test]
    async fn test_post_connection_refused_uses_full_retry_budget() {
        let warnings = Arc::new(AtomicU32::new(0));
        let layer = RetryWarnings(warnings.clone());
        let subscriber = tracing_subscriber::registry().with(layer);
        let client = HttpClient::new(fast_policy()).unwrap();
        let url = format!("{}/api/auth/login", closed_port_url());

        let err = client
            .post_json(&url, &serde_json::json!({"email": "a@b.c"}))
            .with_subscriber(subscriber)
            .await
            .unwrap_err();

        assert!(matches!(err, HttpError::ConnectionRefused(_)));
        // max_retries + 1 attempts
        assert_eq!(warnings.load(Ordering::SeqCst), fast_policy().max_retries);
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                "late"
            }),
        );
        let base = spawn(app).await;
        let policy = RetryPolicy::none().with_timeout(Duration::from_millis(50));
        let client = HttpClient::new(policy).unwrap();

        let err = client.get(&format!("{base}/slow")).await.unwrap_err();

        assert!(matches!(err, HttpError::Timeout(50)));
    }
}
