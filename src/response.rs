// Response wrapper for QNXT API calls

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{truncate_body, ApiError, Result};

/// Top-level key holding the result rows
pub const RESULTS_KEY: &str = "results";

/// Top-level key holding process metadata
pub const METADATA_KEY: &str = "processMetadata";

/// Parsed QNXT response with accessors for its standard sections
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    url: String,
    body: Value,
}

impl Response {
    /// Build a response from its parts
    pub fn new(status: StatusCode, url: impl Into<String>, body: Value) -> Self {
        Self {
            status,
            url: url.into(),
            body,
        }
    }

    /// Read and parse the body of an HTTP response
    ///
    /// An empty body parses as `null`. A non-JSON body on a non-success
    /// status is reported as `ApiError::Status`.
    pub fn from_http(response: reqwest::blocking::Response) -> Result<Self> {
        let status = response.status();
        let url = response.url().to_string();
        let text = response.text()?;

        tracing::debug!(status = %status, url = %url, bytes = text.len(), "Received QNXT response");

        if !status.is_success() {
            tracing::warn!(status = %status, url = %url, "QNXT returned a non-success status");
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(body) => body,
                Err(_) if !status.is_success() => {
                    return Err(ApiError::Status {
                        status: status.as_u16(),
                        message: truncate_body(&text),
                    });
                }
                Err(e) => {
                    return Err(ApiError::InvalidJson {
                        url,
                        message: format!("{} (body: {})", e, truncate_body(&text)),
                    });
                }
            }
        };

        Ok(Self::new(status, url, body))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The entire response body
    pub fn json(&self) -> &Value {
        &self.body
    }

    pub fn into_json(self) -> Value {
        self.body
    }

    /// The `results` section, or `None` (logged) when absent
    pub fn results(&self) -> Option<&Value> {
        self.section(RESULTS_KEY)
    }

    /// The `processMetadata` section, or `None` (logged) when absent
    pub fn metadata(&self) -> Option<&Value> {
        self.section(METADATA_KEY)
    }

    /// Every top-level field except `results` and `processMetadata`
    pub fn overview(&self) -> Option<Map<String, Value>> {
        match self.body.as_object() {
            Some(obj) => Some(
                obj.iter()
                    .filter(|(k, _)| k.as_str() != RESULTS_KEY && k.as_str() != METADATA_KEY)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            None => {
                tracing::warn!(
                    url = %self.url,
                    body = %self,
                    "Response body is not an object, no overview available"
                );
                None
            }
        }
    }

    /// First `n` result rows
    pub fn head(&self, n: usize) -> &[Value] {
        let rows = self.result_rows();
        &rows[..n.min(rows.len())]
    }

    /// Last `n` result rows
    pub fn tail(&self, n: usize) -> &[Value] {
        let rows = self.result_rows();
        &rows[rows.len().saturating_sub(n)..]
    }

    /// Turn a non-success status into `ApiError::Status`
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            return Ok(self);
        }

        Err(ApiError::Status {
            status: self.status.as_u16(),
            message: truncate_body(&self.body.to_string()),
        })
    }

    fn section(&self, key: &str) -> Option<&Value> {
        let value = self.body.get(key);
        if value.is_none() {
            tracing::warn!(
                key = key,
                url = %self.url,
                body = %self,
                "Expected key missing from QNXT response"
            );
        }
        value
    }

    fn result_rows(&self) -> &[Value] {
        match self.results() {
            Some(Value::Array(rows)) => rows.as_slice(),
            Some(_) => {
                tracing::warn!(url = %self.url, "`results` is not a list");
                &[]
            }
            None => &[],
        }
    }
}

/// Pretty-print a JSON value with sorted keys and a four-space indent
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);

    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(buf).unwrap_or_default(),
        Err(e) => format!("<unserializable: {}>", e),
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_pretty_json(&self.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Response {
        Response::new(
            StatusCode::OK,
            "http://qnxt/QNXTApi/Benefit/benefits/P1/B1",
            json!({
                "results": [{"id": 1}, {"id": 2}, {"id": 3}],
                "processMetadata": {"elapsed": 12},
                "totalCount": 3,
                "skip": 0
            }),
        )
    }

    #[test]
    fn test_results_and_metadata() {
        let response = sample();
        assert_eq!(response.results().unwrap().as_array().unwrap().len(), 3);
        assert_eq!(response.metadata().unwrap()["elapsed"], 12);
    }

    #[test]
    fn test_overview_excludes_sections() {
        let overview = sample().overview().unwrap();
        assert_eq!(overview.len(), 2);
        assert_eq!(overview["totalCount"], 3);
        assert!(!overview.contains_key("results"));
        assert!(!overview.contains_key("processMetadata"));
    }

    #[test]
    fn test_missing_keys_return_none() {
        let response = Response::new(StatusCode::OK, "http://qnxt", json!({"message": "ok"}));
        assert!(response.results().is_none());
        assert!(response.metadata().is_none());
        assert!(response.head(5).is_empty());
    }

    #[test]
    fn test_overview_of_non_object_is_none() {
        let response = Response::new(StatusCode::OK, "http://qnxt", json!(true));
        assert!(response.overview().is_none());
    }

    #[test]
    fn test_head_and_tail() {
        let response = sample();
        assert_eq!(response.head(2), &[json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(response.tail(1), &[json!({"id": 3})]);
        assert_eq!(response.head(10).len(), 3);
        assert_eq!(response.tail(10).len(), 3);
        assert!(response.head(0).is_empty());
        assert!(response.tail(0).is_empty());
    }

    #[test]
    fn test_display_sorts_keys_with_four_space_indent() {
        let response = Response::new(StatusCode::OK, "http://qnxt", json!({"b": 1, "a": 2}));
        assert_eq!(response.to_string(), "{\n    \"a\": 2,\n    \"b\": 1\n}");
    }

    #[test]
    fn test_error_for_status() {
        assert!(sample().error_for_status().is_ok());

        let response = Response::new(
            StatusCode::NOT_FOUND,
            "http://qnxt",
            json!({"message": "no such plan"}),
        );
        match response.error_for_status() {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, 404);
                assert!(message.contains("no such plan"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }
}
