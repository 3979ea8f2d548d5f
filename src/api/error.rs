use thiserror::Error;

/// Errors talking to the document service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to reach the service, or the request timed out
    #[error("Connection error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Configured endpoint or returned URL is not a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body was not the expected JSON
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Message suitable for showing to a user.
    ///
    /// For rejected requests this is the server's own `error` text.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_uses_server_text() {
        let err = ApiError::Status {
            status: 400,
            message: "filename too long".to_string(),
        };
        assert_eq!(err.user_message(), "filename too long");
        assert_eq!(err.to_string(), "HTTP 400: filename too long");
    }

    #[test]
    fn test_user_message_for_parse_error() {
        let err: ApiError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.user_message().starts_with("Parse error"));
    }
}
