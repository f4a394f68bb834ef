//! Error types for the batchrun clients

use batchrun_core::dto::ErrorBody;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when calling the remote services
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}, code {code}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Service error code, empty when the body carried none
        code: String,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from a status code and the raw response body
    ///
    /// A JSON `{"code", "message"}` body is unpacked; anything else becomes
    /// the message verbatim.
    pub fn api_error(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) if !parsed.code.is_empty() || !parsed.message.is_empty() => {
                Self::ApiError {
                    status,
                    code: parsed.code,
                    message: parsed.message,
                }
            }
            _ => Self::ApiError {
                status,
                code: String::new(),
                message: body,
            },
        }
    }

    /// Service error code, if this is an API error
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::ApiError { code, .. } if !code.is_empty() => Some(code),
            _ => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_parses_json_body() {
        let err = ClientError::api_error(409, r#"{"code":"PoolExists","message":"taken"}"#);
        assert_eq!(err.code(), Some("PoolExists"));
        assert!(err.to_string().contains("taken"));
    }

    #[test]
    fn test_api_error_keeps_plain_body() {
        let err = ClientError::api_error(503, "upstream unavailable");
        assert_eq!(err.code(), None);
        assert!(matches!(err, ClientError::ApiError { status: 503, .. }));
        assert!(err.to_string().contains("upstream unavailable"));
    }

    #[test]
    fn test_not_found() {
        assert!(ClientError::api_error(404, "").is_not_found());
        assert!(!ClientError::ParseError("x".to_string()).is_not_found());
    }
}
