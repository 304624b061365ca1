//! Error types for scope monitoring.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("Configuration file not found: {}", path.display())]
    ConfigMissing { path: PathBuf },
    #[error("Failed to parse config {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },
    #[error("Bad arguments: {0}")]
    BadArgument(String),
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
    #[error("Error while downloading scope for {program}: HTTP {status}")]
    Fetch { program: String, status: StatusCode },
    #[error("Request for {program} failed: {source}")]
    Transport {
        program: String,
        retryable: bool,
        #[source]
        source: reqwest::Error,
    },
    #[error("Malformed scope export for {program}: {message}")]
    Parse { program: String, message: String },
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScopeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(program: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            program: program.to_string(),
            message: message.into(),
        }
    }

    /// Whether a later attempt could plausibly succeed.
    ///
    /// Nothing in this crate retries; callers use this to label failures.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { retryable, .. } => *retryable,
            Self::Fetch { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    /// Errors that only affect a single program during a watch run.
    pub fn is_per_program(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::Transport { .. } | Self::Parse { .. } | Self::Io { .. }
        )
    }
}

pub type Result<T, E = ScopeError> = std::result::Result<T, E>;
