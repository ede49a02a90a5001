//! Error types for the setup CLI.
//!
//! This module defines the application level errors with actionable messages
//! and recovery suggestions.

use thiserror::Error;

/// Result type alias for setup operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all setup operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Assembly errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            BundlerError::Bundler(error) if error.is_configuration() => vec![
                "Check the [setup], [[application]] and [[service]] sections of the setup file"
                    .to_string(),
                "Applications that are not web start need main_class and main_jar".to_string(),
            ],
            BundlerError::Bundler(error) if error.is_external_tool() => vec![
                "Run with RUST_LOG=debug to see every command line".to_string(),
                "Make sure the Xcode command line tools are installed".to_string(),
            ],
            BundlerError::Bundler(error) if error.is_missing_artifact() => vec![
                "Inspect the output of the nested preference pane build".to_string(),
                "Check that prefpane_template points at a buildable template".to_string(),
            ],
            BundlerError::Toml(_) => {
                vec!["Fix the syntax of the setup file reported above".to_string()]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable
    ///
    /// Configuration, tool and artifact failures abort the pipeline.
    pub fn is_recoverable(&self) -> bool {
        match self {
            BundlerError::Bundler(error) => {
                !(error.is_configuration() || error.is_external_tool() || error.is_missing_artifact())
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::Error;

    #[test]
    fn pipeline_failures_are_not_recoverable() {
        let errors = [
            Error::Configuration("no main class".into()),
            Error::ExternalTool {
                tool: "chmod".into(),
                reason: "exit code 1".into(),
            },
            Error::MissingArtifact {
                path: "pane".into(),
            },
        ];
        for error in errors {
            let error = BundlerError::from(error);
            assert!(!error.is_recoverable(), "{error}");
            assert!(!error.recovery_suggestions().is_empty());
        }
    }
}
