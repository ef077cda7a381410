//! HTTP client module
//!
//! Retrying HTTP client shared read-only by every scenario of a suite.

mod client;
mod retry;

pub(crate) use retry::duration_ms;
pub use client::{join_url, HttpClient, HttpError, HttpResponse, TlsPolicy};
pub use retry::RetryPolicy;
