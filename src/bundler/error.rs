//! Error types for bundle assembly.
//!
//! Provides contextual error chaining, filesystem-specific errors and the
//! three pipeline failure categories:
//!
//! - [`Error::Configuration`] - the setup is insufficient or invalid
//! - [`Error::ExternalTool`] - an invoked tool exited unsuccessfully
//! - [`Error::MissingArtifact`] - a nested build did not produce its output
//!
//! All three abort the current pipeline; nothing is retried or rolled back.
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_setup::bundler::error::{Context, ErrorExt, Result};
//! use std::path::Path;
//!
//! fn read_descriptor(path: &Path) -> Result<String> {
//!     let contents = std::fs::read_to_string(path)
//!         .fs_context("reading build descriptor", path)?;
//!     if contents.is_empty() {
//!         kodegen_bundler_setup::bail!("empty build descriptor: {}", path.display());
//!     }
//!     Ok(contents)
//! }
//! ```

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Errors returned by the bundler.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// User input is insufficient or invalid.
    ///
    /// Raised before any external process runs.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An external tool (bundler, runtime locator, chmod, PlistBuddy, ...)
    /// exited unsuccessfully.
    #[error("{tool} failed: {reason}")]
    ExternalTool {
        /// Tool that failed
        tool: String,
        /// Exit status and captured diagnostics
        reason: String,
    },

    /// The nested build did not produce the expected artifact.
    #[error("failed to produce the preference pane: {} does not exist", path.display())]
    MissingArtifact {
        /// Deterministic location the artifact was expected at
        path: PathBuf,
    },

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "reading config file")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Child process could not be spawned at all.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Error walking directory (payload and runtime copies).
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// ZIP archive extraction error (template archives).
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Invalid glob pattern (runtime include/exclude filters).
    #[error("{0}")]
    GlobPattern(#[from] glob::PatternError),

    /// Handlebars template rendering error.
    #[error("{0}")]
    HandleBarsError(#[from] handlebars::RenderError),

    /// Handlebars template parsing error.
    #[error("{0}")]
    Template(#[from] handlebars::TemplateError),

    /// Property list (plist) writing error.
    #[error("{0}")]
    Plist(#[from] plist::Error),

    /// Application signing failed.
    #[error("failed to sign app: {0}")]
    Sign(String),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Returns the innermost error, skipping any [`Error::Context`] wrappers.
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Error::Context(_, inner) = current {
            current = inner;
        }
        current
    }

    /// True for user-input problems detected before any tool ran.
    pub fn is_configuration(&self) -> bool {
        matches!(self.root(), Error::Configuration(_))
    }

    /// True when an external tool exited unsuccessfully.
    pub fn is_external_tool(&self) -> bool {
        matches!(self.root(), Error::ExternalTool { .. })
    }

    /// True when the nested build produced no artifact.
    pub fn is_missing_artifact(&self) -> bool {
        matches!(self.root(), Error::MissingArtifact { .. })
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with bundler's Error type.
/// Works with both `Result<T, E>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying binary".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::error::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
