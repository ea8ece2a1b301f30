// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ExecError`] is what every [`CommandExecutor`](crate::exec::CommandExecutor)
//!   operation returns. Decorators forward it untouched.
//! - [`ConfigError`] covers loading, validating and wiring configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but did not exit successfully.
    ///
    /// `code` is `None` when the process was terminated by a signal.
    /// `output` holds whatever was captured before exit.
    #[error("'{command}' exited with status {}", display_code(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("'{command}' timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("failed writing output of '{command}' to {path:?}: {source}")]
    OutputFile {
        command: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExecError {
    /// True when the process was stopped because it exceeded its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecError::Timeout { .. })
    }

    /// Exit code of a failed process, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::Failed { code, .. } => *code,
            _ => None,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "signal".to_string(),
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("translating executor requires an inner executor")]
    MissingExecutor,

    #[error("translating executor requires a translator")]
    MissingTranslator,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_distinguishable() {
        let err = ExecError::Timeout {
            command: "sleep".into(),
            timeout: Duration::from_secs(5),
        };
        assert!(err.is_timeout());
        assert_eq!(err.exit_code(), None);
        assert_eq!(err.to_string(), "'sleep' timed out after 5s");
    }

    #[test]
    fn failed_reports_exit_code() {
        let err = ExecError::Failed {
            command: "false".into(),
            code: Some(1),
            output: String::new(),
        };
        assert!(!err.is_timeout());
        assert_eq!(err.exit_code(), Some(1));
        assert_eq!(err.to_string(), "'false' exited with status 1");

        let killed = ExecError::Failed {
            command: "yes".into(),
            code: None,
            output: String::new(),
        };
        assert_eq!(killed.to_string(), "'yes' exited with status signal");
    }
}
