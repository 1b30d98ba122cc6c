//! error types
//!
//! connection, request, structured request, and response parsing errors.

use serde_json::{Map, Value};

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// status reported for request errors that carry no status of their own
pub const DEFAULT_ERROR_STATUS: u16 = 400;

/// error type for repository calls
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// the server could not be reached
    #[error("connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// request variables could not be serialized
    #[error("invalid variables: {0}")]
    Variables(String),

    /// the server answered with errors that follow no known convention
    #[error("request error: {message}")]
    Request {
        /// short description of the failure
        message: String,
        /// raw error payload under the `errors` key
        metadata: Value,
    },

    /// a graphql error carried an `extensions.error` object
    #[error("request error {code} (status {status})")]
    StructuredRequest {
        code: String,
        status: u16,
        metadata: Option<Map<String, Value>>,
    },

    /// the response body was not understood
    #[error("response error: {message}")]
    ParseResponse {
        message: String,
        /// raw response body
        body: String,
    },

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    pub(crate) fn parse_response(message: impl Into<String>, body: impl Into<String>) -> Self {
        Error::ParseResponse {
            message: message.into(),
            body: body.into(),
        }
    }

    pub(crate) fn request(message: impl Into<String>, errors: Value) -> Self {
        let mut metadata = Map::new();
        metadata.insert("errors".to_string(), errors);
        Error::Request {
            message: message.into(),
            metadata: Value::Object(metadata),
        }
    }

    /// short machine readable code for the error
    pub fn code(&self) -> &str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Connection(_) => "CONN_ERROR",
            Error::Variables(_) => "VARIABLES_ERROR",
            Error::Request { .. } => "REQUEST_ERROR",
            Error::StructuredRequest { code, .. } => code,
            Error::ParseResponse { .. } => "RESPONSE_ERROR",
            Error::Cancelled => "CANCELLED",
            Error::DeadlineExceeded => "DEADLINE_EXCEEDED",
        }
    }

    /// http status associated with a request error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Request { .. } => Some(DEFAULT_ERROR_STATUS),
            Error::StructuredRequest { status, .. } => Some(*status),
            Error::Connection(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// metadata attached to a request error
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        match self {
            Error::Request { metadata, .. } => metadata.as_object(),
            Error::StructuredRequest { metadata, .. } => metadata.as_ref(),
            _ => None,
        }
    }

    /// true if the error looks like an auth failure
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status_code(), Some(401 | 403))
    }

    /// true if the call was aborted before a response was classified
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_auth_error() {
        let err = Error::StructuredRequest {
            code: "UNAUTHORIZED".to_string(),
            status: 401,
            metadata: None,
        };
        assert!(err.is_auth_error());

        let err = Error::StructuredRequest {
            code: "FORBIDDEN".to_string(),
            status: 403,
            metadata: None,
        };
        assert!(err.is_auth_error());

        let err = Error::request("boom", json!([]));
        assert!(!err.is_auth_error());
    }

    #[test]
    fn test_request_error_wraps_errors() {
        let err = Error::request("graphql errors", json!([{"message": "x"}]));
        assert_eq!(err.code(), "REQUEST_ERROR");
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.metadata().unwrap()["errors"], json!([{"message": "x"}]));
    }

    #[test]
    fn test_structured_error_code_and_metadata() {
        let mut metadata = Map::new();
        metadata.insert("f".to_string(), json!("v"));
        let err = Error::StructuredRequest {
            code: "BAD".to_string(),
            status: 422,
            metadata: Some(metadata),
        };
        assert_eq!(err.code(), "BAD");
        assert_eq!(err.status_code(), Some(422));
        assert_eq!(err.metadata().unwrap()["f"], "v");
        assert_eq!(err.to_string(), "request error BAD (status 422)");
    }

    #[test]
    fn test_codes() {
        assert_eq!(Error::parse_response("bad", "").code(), "RESPONSE_ERROR");
        assert_eq!(Error::Cancelled.code(), "CANCELLED");
        assert!(Error::DeadlineExceeded.is_cancelled());
        assert_eq!(Error::parse_response("bad", "").status_code(), None);
    }
}
