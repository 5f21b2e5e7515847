//! Error types for taskdeck
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, bad credentials, missing task)
//! - 4: Operation failed (service/network error, local IO)

use thiserror::Error;
use uuid::Uuid;

/// Exit codes for the td CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskdeck operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated; log in first")]
    NotAuthenticated,

    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Operation failures (exit code 4)
    #[error("Service error: {0}")]
    Service(String),

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
            // User errors
            Error::InvalidCredentials
            | Error::NotAuthenticated
            | Error::TaskNotFound(_)
            | Error::ProfileNotFound
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            // Operation failures
            Error::Service(_) | Error::Io(_) | Error::Json(_) | Error::TomlParse(_) => {
                exit_codes::OPERATION_FAILED
            }
        }
    }

    /// Short machine-readable kind, used by JSON output and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidCredentials => "invalid_credentials",
            Error::NotAuthenticated => "not_authenticated",
            Error::TaskNotFound(_) => "task_not_found",
            Error::ProfileNotFound => "profile_not_found",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::InvalidConfig(_) => "invalid_config",
            Error::Service(_) => "service_error",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::TomlParse(_) => "toml_error",
        }
    }
}

// Every transport-level failure surfaces as a service error; callers never
// see reqwest types.
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Service(err.to_string())
    }
}

/// Result type alias for taskdeck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    pub kind: &'static str,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
        }
    }
}
