//! Error types for chat-tasks
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, bad date range, bad config)
//! - 4: Operation failed (source unavailable, IO, serialization)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the chat-tasks CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for chat-tasks operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Invalid assignee pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Space not found: {0}")]
    SpaceNotFound(String),

    #[error("Message archive not found: {0}")]
    ArchiveNotFound(PathBuf),

    // Operation failures (exit code 4)
    #[error("Message source error in {space}: {message}")]
    Source { space: String, message: String },

    #[error("{operation} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        last: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::InvalidDateRange(_)
            | Error::InvalidPattern { .. }
            | Error::SpaceNotFound(_)
            | Error::ArchiveNotFound(_) => exit_codes::USER_ERROR,

            Error::Source { .. }
            | Error::RetriesExhausted { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Source { .. } | Error::Io(_))
    }

    /// Structured details for the JSON error envelope, when the variant has any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::InvalidPattern { pattern, .. } => {
                Some(serde_json::json!({ "pattern": pattern }))
            }
            Error::Source { space, .. } => Some(serde_json::json!({ "space": space })),
            Error::RetriesExhausted {
                operation,
                attempts,
                ..
            } => Some(serde_json::json!({
                "operation": operation,
                "attempts": attempts,
            })),
            Error::ArchiveNotFound(path) => {
                Some(serde_json::json!({ "archive": path.display().to_string() }))
            }
            _ => None,
        }
    }
}

/// Result type alias for chat-tasks operations
pub type Result<T> = std::result::Result<T, Error>;
