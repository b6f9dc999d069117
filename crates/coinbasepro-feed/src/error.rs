/*
[INPUT]:  Error sources (WebSocket, serialization, configuration, message shape)
[OUTPUT]: Structured error types naming the failed transport step or check
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or new checks
*/

use std::time::Duration;
use thiserror::Error;

use crate::validate::MessageField;

/// Main error type for feed checks
#[derive(Error, Debug)]
pub enum FeedError {
    /// WebSocket transport failed
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Server closed the connection
    #[error("Connection closed by server")]
    ConnectionClosed,

    /// No substantive message within the configured bound
    #[error("No message received within {duration:?}")]
    Timeout { duration: Duration },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// First substantive message carried the wrong type tag
    #[error("Invalid message type: expected {expected}, got {actual}")]
    UnexpectedType { expected: String, actual: String },

    /// A required field was absent or held its zero value
    #[error("Field {field} is not set on {message_type} message")]
    MissingField {
        field: MessageField,
        message_type: String,
    },

    /// Follow-up message never arrived
    #[error("Did not find {expected} within {within} messages")]
    FollowUpNotObserved { expected: String, within: usize },
}

impl FeedError {
    /// Check if the error came from a message shape check rather than the transport
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            FeedError::UnexpectedType { .. }
                | FeedError::MissingField { .. }
                | FeedError::FollowUpNotObserved { .. }
        )
    }

    pub(crate) fn unexpected_type(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        FeedError::UnexpectedType {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for FeedError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => FeedError::ConnectionClosed,
            other => FeedError::WebSocket(other.to_string()),
        }
    }
}

/// Result type alias for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;
