//! macOS setup assembler library.
//!
//! This library assembles native macOS setups for Java applications:
//! - application bundles (.app) with an embedded runtime
//! - preference panes (.prefPane) for background services
//! - lifecycle script fragments for packaging backends
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
