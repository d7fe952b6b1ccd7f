//! Error types for the benchmark client.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, BenchError>;

/// The remote operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /questions`
    FetchQuestions,
    /// `GET /leaderboard`
    FetchLeaderboard,
    /// `POST /evaluate`
    Submit,
}

impl Operation {
    /// Message shown to the user when this operation fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            Operation::FetchQuestions => "Failed to fetch questions. Please try again later.",
            Operation::FetchLeaderboard => "Failed to fetch leaderboard. Please try again later.",
            Operation::Submit => "Failed to submit answer. Please try again later.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::FetchQuestions => "fetch questions",
            Operation::FetchLeaderboard => "fetch leaderboard",
            Operation::Submit => "submit answer",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in the benchmark client.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Transport failure or non-2xx response.
    #[error("{operation} failed: {detail}")]
    Network { operation: Operation, detail: String },

    /// The response body could not be decoded.
    #[error("{operation} returned an unreadable response: {detail}")]
    Decode { operation: Operation, detail: String },

    /// A required submission field is blank.
    #[error("Missing input: {0} is required")]
    MissingInput(&'static str),

    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BenchError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn network(operation: Operation, detail: impl Into<String>) -> Self {
        Self::Network {
            operation,
            detail: detail.into(),
        }
    }

    pub fn decode(operation: Operation, detail: impl Into<String>) -> Self {
        Self::Decode {
            operation,
            detail: detail.into(),
        }
    }

    /// The remote operation this error came from, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            BenchError::Network { operation, .. } | BenchError::Decode { operation, .. } => {
                Some(*operation)
            }
            _ => None,
        }
    }

    /// Whether this is a failure of a remote call.
    pub fn is_network_failure(&self) -> bool {
        self.operation().is_some()
    }

    /// User-facing message for this error.
    ///
    /// Remote failures collapse into the fixed per-operation message; the
    /// detail is only meant for logs.
    pub fn user_message(&self) -> String {
        match self.operation() {
            Some(operation) => operation.user_message().to_string(),
            None => self.to_string(),
        }
    }
}
