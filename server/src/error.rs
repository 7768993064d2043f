//! Error types for the KRR MCP server

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the KRR MCP server
#[derive(Debug, Error)]
pub enum Error {
    // Process errors (4000-4099)
    #[error("executable not found: {path}")]
    ExecutableNotFound { path: String },

    #[error("{status}: {output}")]
    NonZeroExit { status: ExitStatus, output: String },

    #[error("scan timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to start {path}: {message}")]
    Spawn { path: String, message: String },

    // Render errors (4100-4199)
    #[error("Failed to format scan result: {0}")]
    Render(String),

    // General errors (1000-1999)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the error code
    pub fn code(&self) -> u32 {
        match self {
            // Process errors (4000-4099)
            Error::ExecutableNotFound { .. } => 4001,
            Error::NonZeroExit { .. } => 4002,
            Error::Timeout(_) => 4003,
            Error::Spawn { .. } => 4004,

            // Render errors (4100-4199)
            Error::Render(_) => 4101,

            // General errors (1000-1999)
            Error::Internal(_) => 1003,
        }
    }

    /// Whether the failure means KRR itself is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ExecutableNotFound { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Internal(err.to_string())
    }
}
