//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation of
//! the combinations clap cannot express.

use crate::metadata::Tool;
use clap::Parser;
use std::path::PathBuf;

/// macOS setup assembler for Java applications
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_setup",
    version,
    about = "macOS setup assembler for Java applications",
    long_about = "Assembles .app bundles with an embedded Java runtime and service preference panes
from a declarative setup file.

Usage:
  kodegen_bundler_setup --config setup.toml --tool dmg
  kodegen_bundler_setup --config setup.toml --tool pkg --build-dir /tmp/setup

Exit code 0 = every bundle of the setup was assembled."
)]
pub struct Args {
    /// Setup file describing the applications and services
    #[arg(short, long, value_name = "FILE", default_value = "setup.toml")]
    pub config: PathBuf,

    /// Task consuming the bundles; only dmg uses the image options
    #[arg(short, long, value_enum, default_value = "dmg")]
    pub tool: Tool,

    /// Directory to assemble the bundles in
    ///
    /// Defaults to `<project build dir>/<tool>`.
    #[arg(short, long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.config.as_os_str().is_empty() {
            return Err("Setup file path cannot be empty".to_string());
        }
        if !self.config.is_file() {
            return Err(format!(
                "Setup file not found: {}",
                self.config.display()
            ));
        }
        if let Some(dir) = &self.build_dir
            && dir.is_file()
        {
            return Err(format!(
                "Build directory {} is an existing file",
                dir.display()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_tool_selection() {
        let args = Args::try_parse_from(["kodegen_bundler_setup"]).unwrap();
        assert_eq!(args.config, PathBuf::from("setup.toml"));
        assert_eq!(args.tool, Tool::Dmg);
        assert!(args.build_dir.is_none());

        let args = Args::try_parse_from([
            "kodegen_bundler_setup",
            "--tool",
            "pkg",
            "--build-dir",
            "out",
        ])
        .unwrap();
        assert_eq!(args.tool, Tool::Pkg);
        assert_eq!(args.build_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn unknown_tool_is_rejected() {
        assert!(Args::try_parse_from(["kodegen_bundler_setup", "--tool", "msi"]).is_err());
    }

    #[test]
    fn missing_config_fails_validation() {
        let args = Args::try_parse_from([
            "kodegen_bundler_setup",
            "--config",
            "/nonexistent/setup.toml",
        ])
        .unwrap();
        assert!(args.validate().unwrap_err().contains("not found"));
    }
}
