//! Command line interface for the setup assembler.
//!
//! Parses arguments, loads the setup file and runs the [`Bundler`] for the
//! selected tool.

mod args;

pub use args::Args;

use crate::bundler::Bundler;
use crate::error::{CliError, Result};
use crate::metadata::load_manifest;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(&args).await
}

/// Runs the assembly described by `args`.
pub async fn execute(args: &Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let manifest = load_manifest(&args.config)?;
    let task = manifest.task(args.tool, args.build_dir.as_deref());
    log::info!(
        "Assembling {} into {}",
        manifest.setup.application(),
        task.build_dir.display()
    );

    let bundler = Bundler::new(manifest, task).await?;
    let artifacts = match bundler.bundle().await {
        Ok(artifacts) => artifacts,
        Err(error) => {
            let error = crate::error::BundlerError::from(error);
            for suggestion in error.recovery_suggestions() {
                log::warn!("{}", suggestion);
            }
            return Err(error);
        }
    };

    for artifact in &artifacts {
        println!(
            "✓ {} {}: {}",
            artifact.kind,
            artifact.name,
            artifact.path.display()
        );
    }
    Ok(0)
}

