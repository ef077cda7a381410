//! Assertion helpers shared by the scenarios

use serde_json::Value;
use std::fmt;

use crate::http::HttpResponse;

/// Longest response body excerpt carried in a failure message
const BODY_EXCERPT_LEN: usize = 200;

/// A check that did not hold, with the input that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    pub input: String,
    pub expected: String,
    pub actual: String,
    pub detail: Option<String>,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.input, self.expected, self.actual
        )?;
        if let Some(detail) = &self.detail {
            write!(f, " (response: {detail})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AssertionFailure {}

impl AssertionFailure {
    pub fn new(
        input: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            expected: expected.into(),
            actual: actual.into(),
            detail: None,
        }
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.detail = Some(excerpt(body));
        self
    }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() <= BODY_EXCERPT_LEN {
        body.to_string()
    } else {
        let cut: String = body.chars().take(BODY_EXCERPT_LEN).collect();
        format!("{cut}...")
    }
}

pub fn expect_status(
    response: &HttpResponse,
    expected: u16,
    input: &str,
) -> Result<(), AssertionFailure> {
    if response.status_code == expected {
        Ok(())
    } else {
        Err(AssertionFailure::new(
            input,
            format!("status {expected}"),
            format!("status {}", response.status_code),
        )
        .with_body(&response.body))
    }
}

pub fn json_body(response: &HttpResponse, input: &str) -> Result<Value, AssertionFailure> {
    response.json().map_err(|e| {
        AssertionFailure::new(input, "a JSON body", format!("invalid JSON ({e})"))
            .with_body(&response.body)
    })
}

pub fn field<'a>(json: &'a Value, name: &str, input: &str) -> Result<&'a Value, AssertionFailure> {
    json.get(name).ok_or_else(|| {
        AssertionFailure::new(input, format!("field `{name}`"), "no such field")
            .with_body(&json.to_string())
    })
}

pub fn expect_field_eq(
    json: &Value,
    name: &str,
    expected: &Value,
    input: &str,
) -> Result<(), AssertionFailure> {
    let actual = field(json, name, input)?;
    if actual == expected {
        Ok(())
    } else {
        Err(AssertionFailure::new(
            input,
            format!("`{name}` == {expected}"),
            format!("`{name}` == {actual}"),
        ))
    }
}

/// Case-insensitive: passes when the header contains any of `needles`
pub fn expect_header_contains_any(
    response: &HttpResponse,
    header: &str,
    needles: &[&str],
    input: &str,
) -> Result<(), AssertionFailure> {
    if needles
        .iter()
        .any(|needle| response.header_contains_ci(header, needle))
    {
        return Ok(());
    }
    let wanted = needles
        .iter()
        .map(|n| format!("\"{n}\""))
        .collect::<Vec<_>>()
        .join(" or ");
    let actual = match response.get_header(header) {
        Some(value) => format!("{header}: {value}"),
        None => format!("no {header} header"),
    };
    let expected = format!("{header} containing {wanted}");
    Err(AssertionFailure::new(input, expected, actual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn response(status: u16, headers: &[(&str, &str)], body: &str) -> HttpResponse {
        HttpResponse {
            status_code: status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            body: body.to_string(),
            duration_ms: 1,
        }
    }

    #[test]
    fn test_status_mismatch_names_input_and_values() {
        let resp = response(200, &[], r#"{"success":true}"#);
        let err = expect_status(&resp, 400, "POST /api/auth/login email=\"user@\"").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("email=\"user@\""));
        assert!(msg.contains("expected status 400, got status 200"));
        assert!(msg.contains("success"));
    }

    #[test]
    fn test_missing_field_is_a_failure() {
        let value = json!({"status": "Healthy"});
        let err = field(&value, "timestamp", "GET /api/health").unwrap_err();
        assert_eq!(err.actual, "no such field");
    }

    #[test]
    fn test_field_eq_is_strict_on_type() {
        let expected = json!(true);
        let value = json!({"success": "true"});
        let result = expect_field_eq(&value, "success", &expected, "login");
        assert!(result.is_err());
        let value = json!({"success": true});
        let result = expect_field_eq(&value, "success", &expected, "login");
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_json_is_a_failure() {
        let resp = response(200, &[], "<html>oops</html>");
        let err = json_body(&resp, "GET /api/health").unwrap_err();
        assert!(err.actual.starts_with("invalid JSON"));
    }

    #[test]
    fn test_header_contains_any() {
        let resp = response(200, &[("cache-control", "Max-Age=0, must-revalidate")], "");
        let fresh = ["no-cache", "max-age=0"];
        let result = expect_header_contains_any(&resp, "cache-control", &fresh, "GET /");
        assert!(result.is_ok());

        let resp = response(200, &[], "");
        let result = expect_header_contains_any(&resp, "cache-control", &["no-cache"], "GET /");
        let err = result.unwrap_err();
        assert_eq!(err.actual, "no cache-control header");
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let err = AssertionFailure::new("in", "a", "b").with_body(&body);
        assert_eq!(err.detail.unwrap().len(), BODY_EXCERPT_LEN + 3);
    }
}
