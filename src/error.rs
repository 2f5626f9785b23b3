// src/error.rs
//! Error types for the recipe book

use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the repository, the server and the CI pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error during file or process operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Recipe does not exist
    #[error("recipe not found: id={0}")]
    NotFound(u32),

    /// Recipe update without an id
    #[error("missing recipe ID")]
    MissingId,

    /// Unknown pipeline task name
    #[error("unknown task '{0}' (expected one of: setup, build, test, qa, all)")]
    UnknownTask(String),

    /// External tool is not installed
    #[error("required tool not found in PATH: {0}")]
    ToolNotFound(String),

    /// A pipeline step exited unsuccessfully
    #[error("{task} step `{command}` failed with {}", exit_description(.code))]
    StepFailed {
        task: String,
        command: String,
        /// Exit code, or None if the process was killed by a signal
        code: Option<i32>,
    },

    /// Blocking repository work panicked or was cancelled
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Database schema is in an unexpected state
    #[error("schema error: {0}")]
    Schema(String),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}

impl Error {
    /// Process exit code to report for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::StepFailed { code: Some(code), .. } => *code,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failed_message() {
        let err = Error::StepFailed {
            task: "qa".to_string(),
            command: "cargo clippy".to_string(),
            code: Some(101),
        };
        assert_eq!(err.to_string(), "qa step `cargo clippy` failed with exit code 101");
        assert_eq!(err.exit_code(), 101);
    }

    #[test]
    fn test_signal_exit_code() {
        let err = Error::StepFailed {
            task: "test".to_string(),
            command: "cargo test".to_string(),
            code: None,
        };
        assert!(err.to_string().ends_with("a signal"));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(Error::MissingId.exit_code(), 1);
    }
}
