//! Error types module
//!
//! Every failure a widget can run into is represented by [`ClientError`]. The
//! variants follow the taxonomy used when surfacing messages to the user:
//! transport failures, 4xx validation failures (with the parsed response body
//! so field-level messages can be matched to form inputs) and 5xx server
//! failures.

use serde_json::Value;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Broad class of a failure, used to pick how it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never produced an HTTP response.
    Transport,
    /// HTTP 4xx.
    Validation,
    /// HTTP 5xx.
    Server,
    /// Local failures (decoding, configuration, bad input).
    Other,
}

/// Metadata for errors - defines how an error should be presented and logged
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "TRANSPORT_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same call could succeed. Nothing retries
    /// automatically; this only drives wording.
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Err {status}: {status_text}")]
    Status {
        status: u16,
        status_text: String,
        body: Option<Value>,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No media item is selected")]
    NoSelection,
}

impl ClientError {
    /// Build a status error from a raw status code and optional JSON body.
    pub fn status(status: u16, status_text: impl Into<String>, body: Option<Value>) -> Self {
        ClientError::Status {
            status,
            status_text: status_text.into(),
            body,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Transport(_) => FailureKind::Transport,
            ClientError::Status { status, .. } if (500..600).contains(status) => {
                FailureKind::Server
            }
            ClientError::Status { .. } => FailureKind::Validation,
            _ => FailureKind::Other,
        }
    }

    /// HTTP status code, when the failure came from a response.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed JSON body of a failed response, if any.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ClientError::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

impl ErrorMetadata for ClientError {
    fn error_code(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Status { .. } => match self.kind() {
                FailureKind::Server => "SERVER_ERROR",
                _ => "VALIDATION_ERROR",
            },
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::Config(_) => "CONFIG_ERROR",
            ClientError::InvalidInput(_) => "INVALID_INPUT",
            ClientError::NoSelection => "NO_SELECTION",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self.kind(), FailureKind::Transport | FailureKind::Server)
    }

    fn log_level(&self) -> LogLevel {
        match self.kind() {
            FailureKind::Validation => LogLevel::Debug,
            FailureKind::Other => LogLevel::Warn,
            FailureKind::Transport | FailureKind::Server => LogLevel::Error,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::InvalidInput(format!("IO error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_classification() {
        let err = ClientError::status(503, "Service Unavailable", None);
        assert_eq!(err.kind(), FailureKind::Server);
        assert_eq!(err.error_code(), "SERVER_ERROR");
        assert!(err.is_recoverable());

        let err = ClientError::status(400, "Bad Request", Some(json!({"detail": "nope"})));
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.log_level(), LogLevel::Debug);
        assert_eq!(err.body(), Some(&json!({"detail": "nope"})));
    }

    #[test]
    fn status_display_matches_banner_format() {
        let err = ClientError::status(500, "Internal Server Error", None);
        assert_eq!(err.to_string(), "Err 500: Internal Server Error");
        assert_eq!(err.http_status(), Some(500));
    }

    #[test]
    fn local_errors_are_not_recoverable() {
        assert!(!ClientError::NoSelection.is_recoverable());
        assert_eq!(ClientError::Config("x".into()).kind(), FailureKind::Other);
    }
}
