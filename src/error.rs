//! Overlay error types
//!
//! Every remote-facing operation returns `Result<T, CanError>`. The enum is
//! serializable so a failure travels back over the wire as a value instead of
//! a dropped connection.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanError {
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Node already owns a zone")]
    AlreadyJoined,

    #[error("Node has not joined the overlay")]
    NotJoined,

    #[error("Failed to pull {} transferred file(s): {}", failed.len(), failed.join(", "))]
    TransferPartialFailure { failed: Vec<String> },

    #[error("Remote call timed out")]
    Timeout,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl CanError {
    /// HTTP status used when this error is the body of a reply.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CanError::RemoteUnavailable(_) => StatusCode::BAD_GATEWAY,
            CanError::NotFound(_) => StatusCode::NOT_FOUND,
            CanError::AlreadyJoined => StatusCode::CONFLICT,
            CanError::NotJoined => StatusCode::PRECONDITION_FAILED,
            CanError::TransferPartialFailure { .. } => StatusCode::MULTI_STATUS,
            CanError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            CanError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CanError::Protocol(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<std::io::Error> for CanError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            CanError::NotFound(e.to_string())
        } else {
            CanError::Storage(e.to_string())
        }
    }
}

impl From<reqwest::Error> for CanError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CanError::Timeout
        } else if e.is_decode() {
            CanError::Protocol(e.to_string())
        } else {
            CanError::RemoteUnavailable(e.to_string())
        }
    }
}

/// Result type for overlay operations
pub type Result<T> = std::result::Result<T, CanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reply_survives_the_wire() {
        let reply: Result<u64> = Err(CanError::TransferPartialFailure {
            failed: vec!["a.txt".to_string(), "b.txt".to_string()],
        });
        let json = serde_json::to_string(&reply).unwrap();
        let decoded: Result<u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, reply);
    }

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(CanError::from(io), CanError::NotFound(_)));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        assert!(matches!(CanError::from(io), CanError::Storage(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CanError::NotJoined.status_code(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(CanError::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            CanError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_partial_failure_message_lists_files() {
        let e = CanError::TransferPartialFailure {
            failed: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(e.to_string(), "Failed to pull 2 transferred file(s): a, b");
    }
}
