//! Locating the Java runtime to embed.

use crate::bundler::{
    error::{Error, Result},
    process::{ProcessExecutor, run_checked},
    settings::RuntimeSpec,
};
use std::path::{Path, PathBuf};

/// Location of the runtime locator on macOS.
pub const JAVA_HOME: &str = "/usr/libexec/java_home";

/// Resolves a runtime spec to a runtime directory.
///
/// The spec is tried as a local directory (relative to `base_dir`) first.
/// Otherwise it is treated as a version and handed to `java_home -v <v> -F`,
/// whose single output line is the candidate directory.
///
/// # Errors
///
/// [`Error::ExternalTool`] if the locator fails or its answer is not a
/// directory.
pub async fn locate_runtime<E: ProcessExecutor + ?Sized>(
    executor: &E,
    program: &str,
    spec: &RuntimeSpec,
    base_dir: &Path,
) -> Result<PathBuf> {
    if let Some(dir) = spec.local_dir(base_dir) {
        log::debug!("Using local runtime {}", dir.display());
        return Ok(dir);
    }

    let args = vec![
        "-v".to_string(),
        spec.as_str().to_string(),
        "-F".to_string(),
    ];
    let output = run_checked(executor, "java_home", program, &args, None).await?;
    let candidate = PathBuf::from(output.stdout.lines().next().unwrap_or_default().trim());

    if candidate.as_os_str().is_empty() || !candidate.is_dir() {
        return Err(Error::ExternalTool {
            tool: "java_home".into(),
            reason: format!(
                "runtime version {} cannot be located at {}",
                spec,
                candidate.display()
            ),
        });
    }

    log::info!("Located runtime {} at {}", spec, candidate.display());
    Ok(candidate)
}
