use std::time::Duration;

use thiserror::Error;

/// Errors from talking to the chat backend.
///
/// `SessionNotFound` is kept distinct from every other failure because it is
/// the only condition the controller recovers from automatically.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("session not found")]
    SessionNotFound,

    #[error("decode failure: {0}")]
    Decode(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("exchange cancelled")]
    Cancelled,
}

impl ChatError {
    pub fn is_session_not_found(&self) -> bool {
        matches!(self, ChatError::SessionNotFound)
    }
}

/// Errors from resolving client settings before any request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("no API key configured (set ASKME_API_KEY or pass --api-key)")]
    MissingApiKey,

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = ChatError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn test_is_session_not_found() {
        assert!(ChatError::SessionNotFound.is_session_not_found());
        assert!(!ChatError::Transport("refused".to_string()).is_session_not_found());
        assert!(
            !ChatError::Status {
                status: 404,
                body: String::new()
            }
            .is_session_not_found()
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = ChatError::Timeout(Duration::from_secs(30));
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ZeroTimeout {
            field: "request_timeout_secs",
        };
        assert_eq!(err.to_string(), "request_timeout_secs must be greater than zero");
        assert!(ConfigError::MissingApiKey.to_string().contains("ASKME_API_KEY"));
    }
}
