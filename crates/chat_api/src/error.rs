use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// JSON body returned instead of a frame stream when a request fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug)]
pub enum ChatApiError {
    InvalidHeader(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
}

impl fmt::Display for ChatApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHeader(key) => write!(f, "invalid header value for {key}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
        }
    }
}

impl std::error::Error for ChatApiError {}

impl From<reqwest::Error> for ChatApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

/// Extracts a human-readable message from an error response body, falling
/// back to the status line when the body is empty or not an error body.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if !parsed.error.trim().is_empty() {
            return parsed.error;
        }
    }

    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

/// Maps an upstream provider failure to the status and error body emitted at
/// the gateway boundary. Auth failures map to 401, connection failures to
/// 503, everything else stays a 500 with the provider's message.
#[must_use]
pub fn upstream_error_response(message: &str, kind: Option<&str>) -> (StatusCode, ErrorBody) {
    let body = |error: &str| match kind {
        Some(kind) => ErrorBody::new(error).with_details(kind),
        None => ErrorBody::new(error),
    };

    if message.contains("rate limit") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            body("Rate limit exceeded. Please try again in a moment."),
        );
    }
    if message.contains("Connection error") || kind == Some("ApiConnectionError") {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            body("Connection to the model provider failed. Please check your network connection and API key."),
        );
    }
    if message.contains("authentication") {
        return (
            StatusCode::UNAUTHORIZED,
            body("Authentication failed. Please check your API key."),
        );
    }

    (StatusCode::INTERNAL_SERVER_ERROR, body(message))
}

/// Body returned when a request carries no usable messages.
#[must_use]
pub fn empty_request_response() -> (StatusCode, ErrorBody) {
    (
        StatusCode::BAD_REQUEST,
        ErrorBody::new("No valid messages to send"),
    )
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::{
        empty_request_response, parse_error_message, upstream_error_response, ErrorBody,
    };

    #[test]
    fn parse_error_message_prefers_the_error_field() {
        let body = r#"{"error":"Authentication failed. Please check your API key."}"#;
        assert_eq!(
            parse_error_message(StatusCode::UNAUTHORIZED, body),
            "Authentication failed. Please check your API key."
        );
    }

    #[test]
    fn parse_error_message_falls_back_to_raw_body_then_status() {
        assert_eq!(
            parse_error_message(StatusCode::BAD_GATEWAY, "upstream exploded"),
            "upstream exploded"
        );
        assert_eq!(
            parse_error_message(StatusCode::BAD_GATEWAY, ""),
            "Bad Gateway"
        );
    }

    #[test]
    fn upstream_auth_failures_map_to_unauthorized() {
        let (status, body) = upstream_error_response("authentication failed for key", None);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.error.contains("Authentication failed"));
    }

    #[test]
    fn upstream_connection_failures_map_to_service_unavailable() {
        let (status, _) = upstream_error_response("Connection error: refused", None);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = upstream_error_response("socket closed", Some("ApiConnectionError"));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.details.as_deref(), Some("ApiConnectionError"));
    }

    #[test]
    fn upstream_rate_limit_keeps_internal_error_status_with_friendly_text() {
        let (status, body) = upstream_error_response("rate limit exceeded", None);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.error.contains("Rate limit exceeded"));
    }

    #[test]
    fn unknown_upstream_failures_pass_the_message_through() {
        let (status, body) = upstream_error_response("model overloaded", None);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "model overloaded");
    }

    #[test]
    fn empty_request_is_a_bad_request() {
        let (status, body) = empty_request_response();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, ErrorBody::new("No valid messages to send"));
    }

    #[test]
    fn error_body_serializes_without_absent_details() {
        let json = serde_json::to_string(&ErrorBody::new("boom")).expect("serialize");
        assert_eq!(json, r#"{"error":"boom"}"#);
    }
}
