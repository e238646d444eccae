//! Error types for HTTP round trips

use bytes::Bytes;
use smol_str::SmolStr;

/// Transport-level errors that occur during HTTP communication
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TransportError {
    /// Failed to establish connection to server
    #[error("Connection error: {0}")]
    #[diagnostic(
        code(indieauth_common::transport::connect),
        help("check network connectivity and TLS configuration")
    )]
    Connect(String),

    /// Request timed out
    #[error("Request timeout")]
    #[diagnostic(code(indieauth_common::transport::timeout))]
    Timeout,

    /// Request construction failed (malformed URI, headers, etc.)
    #[error("Invalid request: {0}")]
    #[diagnostic(code(indieauth_common::transport::invalid_request))]
    InvalidRequest(String),

    /// Other transport error, including cancellation reported by the client
    #[error("Transport error: {0}")]
    #[diagnostic(code(indieauth_common::transport::other))]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() || e.is_request() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Other(Box::new(e))
        }
    }
}

/// A response arrived, but its status was outside `200..=299`.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[diagnostic(
    code(indieauth_common::http_status),
    help("inspect the response body; IndieAuth servers report `error` and `error_description`")
)]
pub struct HttpStatusError {
    /// URL the request was sent to
    pub url: SmolStr,
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response body if one was sent
    pub body: Option<Bytes>,
}

impl HttpStatusError {
    /// Whether the status is one of the given codes.
    pub fn status_in(&self, codes: &[u16]) -> bool {
        codes.contains(&self.status.as_u16())
    }
}

impl std::fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} from {}", self.status, self.url)?;
        if let Some(body) = &self.body {
            if let Ok(s) = std::str::from_utf8(body) {
                write!(f, ":\n{}", s)?;
            }
        }
        Ok(())
    }
}

/// Outcome of the response validator when a round trip did not succeed.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ResponseError {
    /// The HTTP client failed before a response arrived
    #[error(transparent)]
    #[diagnostic(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status
    #[error(transparent)]
    #[diagnostic(transparent)]
    Status(#[from] HttpStatusError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_includes_body() {
        let err = HttpStatusError {
            url: "https://example.com/token".into(),
            status: http::StatusCode::BAD_REQUEST,
            body: Some(Bytes::from_static(br#"{"error":"invalid_grant"}"#)),
        };
        let text = err.to_string();
        assert!(text.starts_with("HTTP 400 Bad Request from https://example.com/token"));
        assert!(text.contains("invalid_grant"));
        assert!(err.status_in(&[400, 401, 403]));
        assert!(!err.status_in(&[500]));
    }
}
