//! The nested build compiling the preference pane.

use crate::bundler::{
    error::{Context, Result},
    process::{ProcessExecutor, run_checked},
};
use std::future::Future;
use std::path::Path;

/// Tasks run by the nested build, in order.
pub const NESTED_BUILD_TASKS: [&str; 2] = ["clean", "xcodebuild"];

/// Runs an isolated build of a materialized template.
pub trait NestedBuild {
    /// Runs `tasks` in order using the build descriptor at `build_file`.
    fn run(&self, build_file: &Path, tasks: &[&str]) -> impl Future<Output = Result<()>>;
}

impl<N: NestedBuild + ?Sized> NestedBuild for &N {
    fn run(&self, build_file: &Path, tasks: &[&str]) -> impl Future<Output = Result<()>> {
        (**self).run(build_file, tasks)
    }
}

/// Runs the nested build as a separate Gradle process.
#[derive(Debug, Clone)]
pub struct GradleBuild<E> {
    executor: E,
    program: String,
}

impl<E: ProcessExecutor> GradleBuild<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            program: "gradle".to_string(),
        }
    }

    /// Uses a different Gradle launcher, e.g. a wrapper script.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl<E: ProcessExecutor> NestedBuild for GradleBuild<E> {
    async fn run(&self, build_file: &Path, tasks: &[&str]) -> Result<()> {
        let mut args = vec!["-b".to_string(), build_file.display().to_string()];
        args.extend(tasks.iter().map(|task| task.to_string()));

        log::info!("Running nested build {} ({})", build_file.display(), tasks.join(", "));
        run_checked(
            &self.executor,
            "nested build",
            &self.program,
            &args,
            build_file.parent(),
        )
        .await
        .with_context(|| format!("building {}", build_file.display()))?;
        Ok(())
    }
}
