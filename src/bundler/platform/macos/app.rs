//! Application bundle assembly.
//!
//! [`BundleAssembler`] walks an [`Application`] through the assembly phases
//! in a fixed order and stops at the first failure:
//!
//! 1. prepare: output directory, names, full version
//! 2. short version: truncated before the second `.`
//! 3. bundle identifier
//! 4. validation of main class and main jar (skipped for web start)
//! 5. launch configuration: options, arguments, icon, architectures
//! 6. runtime embedding
//! 7. bundle writing
//! 8. payload copy and permission normalization
//!
//! Phases 1 to 5 never start a process, so configuration problems surface
//! before any external tool runs.

use super::appbundler::{AppBundler, AppBundlerTask, BundleDocument, BundleRuntime};
use super::runtime::{JAVA_HOME, locate_runtime};
use crate::bundler::{
    error::{Context, Error, Result},
    process::{ProcessExecutor, run_checked},
    settings::{Application, DocumentType, SetupConfiguration, SetupTask, TaskKind},
    utils::{alphanumeric, fs},
};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Runtime entries embedded when the consuming task supplies no filters.
const DEFAULT_RUNTIME_INCLUDES: &[&str] = &["bin/java"];

/// Derives the short version shown by Finder.
///
/// Everything from the second `.` on is dropped:
/// `"1.2.3.4"` becomes `"1.2"`, while `"1.2"` and `"1"` stay as they are.
pub fn short_version(version: &str) -> &str {
    let Some(first) = version.find('.') else {
        return version;
    };
    match version[first + 1..].find('.') {
        Some(second) => &version[..first + 1 + second],
        None => version,
    }
}

/// Derives the bundle identifier of an application.
///
/// Applications whose display name differs from the setup application name
/// get the sanitized display name appended, so several bundles of one setup
/// never share an identifier.
pub fn bundle_identifier(setup: &SetupConfiguration, display_name: &str) -> String {
    let mut identifier = setup.app_identifier().to_string();
    if display_name != setup.application() {
        identifier.push('.');
        identifier.push_str(&alphanumeric(display_name));
    }
    identifier
}

/// Checks that `name` can be used as a single file name inside the build
/// directory.
///
/// Empty names, `.`, `..` and names containing `/` or NUL are rejected.
pub fn validate_bundle_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
        return Err(Error::Configuration(format!(
            "{kind} '{name}' cannot be used as a file name; it must be non-empty, \
             must not be '.' or '..' and must not contain '/'"
        )));
    }
    Ok(())
}

/// Assembles one `.app` bundle for a setup task.
pub struct BundleAssembler<'a, E> {
    setup: &'a SetupConfiguration,
    task: &'a SetupTask,
    executor: E,
    bundler: AppBundler,
    java_home: String,
    bundle: AppBundlerTask,
}

impl<'a, E: ProcessExecutor> BundleAssembler<'a, E> {
    pub fn new(setup: &'a SetupConfiguration, task: &'a SetupTask, executor: E) -> Self {
        Self {
            setup,
            task,
            executor,
            bundler: AppBundler,
            java_home: JAVA_HOME.to_string(),
            bundle: AppBundlerTask::default(),
        }
    }

    /// Uses a runtime locator at a different location.
    pub fn with_java_home(mut self, program: impl Into<String>) -> Self {
        self.java_home = program.into();
        self
    }

    /// Runs every phase for `application` and returns the bundle path.
    pub async fn assemble(&mut self, application: &Application) -> Result<PathBuf> {
        let name = application.display_name(self.setup).to_string();
        log::info!("Assembling application bundle for {}", name);

        self.prepare_application(application, application.webstart)
            .with_context(|| format!("preparing {name}"))?;
        self.set_document_types(&application.document_types);
        for scheme in &application.schemes {
            self.add_scheme(scheme);
        }

        self.finish_application()
            .await
            .with_context(|| format!("writing bundle for {name}"))?;
        self.copy_bundle_files()
            .await
            .with_context(|| format!("post-processing bundle for {name}"))?;

        Ok(self.bundle_path())
    }

    /// Prepares the bundle description (phases 1 to 5).
    ///
    /// `is_webstart` skips the main class and main jar requirements.
    pub fn prepare_application(&mut self, application: &Application, is_webstart: bool) -> Result<()> {
        let setup = self.setup;
        let display_name = application.display_name(setup).to_string();
        let version = setup.version();
        validate_bundle_name("display name", &display_name)?;
        validate_bundle_name("executable name", application.executable(setup))?;

        log::debug!("Build directory: {}", self.task.build_dir.display());
        self.bundle.output_directory = self.task.build_dir.clone();
        self.bundle.name = display_name.clone();
        self.bundle.display_name = display_name.clone();
        self.bundle.version = version.to_string();
        self.bundle.short_version = short_version(version).to_string();
        self.bundle.executable_name = application.executable(setup).to_string();
        self.bundle.identifier = bundle_identifier(setup, &display_name);

        let mut main_jar = application.main_jar(setup).map(str::to_string);
        if let Some(work_dir) = &application.work_dir {
            self.bundle.working_directory = Some(format!("$APP_ROOT/Contents/Java/{work_dir}"));
            main_jar = main_jar.map(|jar| format!("{}/{}", work_dir.trim_end_matches('/'), jar));
        }

        if !is_webstart {
            let main_class = application.main_class(setup).ok_or_else(|| {
                Error::Configuration(
                    "a main class is required for the application; set 'main_class' in the \
                     [setup] section or on the application"
                        .into(),
                )
            })?;
            let main_jar = main_jar.ok_or_else(|| {
                Error::Configuration(
                    "a main jar file is required for the application; set 'main_jar' in the \
                     [setup] section or on the application"
                        .into(),
                )
            })?;

            self.bundle.main_class_name = Some(main_class.to_string());
            self.bundle.jar_launcher_name = Some(main_jar);
            self.bundle.options = application.java_vm_arguments.clone();
            self.bundle.arguments = application.start_argument_list();
        }

        self.bundle.ignore_psn = true;
        self.bundle.copyright = setup.copyright();
        self.bundle.icon = Some(self.application_icon()?);
        self.bundle.runtime_target = setup.bundle_jre_target().to_string();
        self.bundle.launcher = self.task.launcher.as_deref().map(|path| self.project_path(path));

        if let TaskKind::Dmg(image) = &self.task.kind {
            self.bundle.architectures = image.architecture.clone();
            self.bundle.library_paths = image
                .native_libraries
                .iter()
                .map(|path| self.project_path(path))
                .collect();
        }

        Ok(())
    }

    /// Adds document type associations; all of them share the application icon.
    pub fn set_document_types(&mut self, documents: &[DocumentType]) {
        let icon = self.bundle.icon.clone().unwrap_or_default();
        self.bundle
            .documents
            .extend(documents.iter().map(|doc| BundleDocument {
                extensions: doc.file_extension.join(","),
                name: doc.name.clone(),
                role: doc.role.as_str().to_string(),
                icon: icon.clone(),
            }));
    }

    /// Registers a URL scheme; empty schemes are ignored.
    pub fn add_scheme(&mut self, scheme: &str) {
        if scheme.is_empty() {
            return;
        }
        self.bundle.schemes.push(scheme.to_string());
    }

    /// Embeds the runtime and writes the bundle (phases 6 and 7).
    pub async fn finish_application(&mut self) -> Result<PathBuf> {
        self.bundle_jre().await?;

        self.bundler
            .execute(&self.bundle)
            .await
            .map_err(|error| Error::ExternalTool {
                tool: "appbundler".into(),
                reason: error.to_string(),
            })
    }

    /// Attaches the configured runtime, if any (phase 6).
    pub async fn bundle_jre(&mut self) -> Result<()> {
        let Some(spec) = self.setup.bundle_jre() else {
            return Ok(());
        };

        let dir = locate_runtime(
            &self.executor,
            &self.java_home,
            spec,
            &self.setup.project().dir,
        )
        .await?;
        log::info!("Bundling runtime {}", dir.display());

        let (includes, excludes) = match &self.task.kind {
            TaskKind::Dmg(image) => (image.jre_includes.clone(), image.jre_excludes.clone()),
            TaskKind::Pkg => (
                DEFAULT_RUNTIME_INCLUDES.iter().map(|s| s.to_string()).collect(),
                Vec::new(),
            ),
        };

        self.bundle.runtime = Some(BundleRuntime {
            dir,
            includes,
            excludes,
        });
        Ok(())
    }

    /// Copies the task payload into `Contents/Java` and normalizes
    /// permissions (phase 8).
    pub async fn copy_bundle_files(&self) -> Result<()> {
        let destination = self.bundle_path();
        let java_dir = destination.join("Contents").join("Java");

        for entry in &self.task.payload {
            let source = self.project_path(entry.source());
            let file_name = source
                .file_name()
                .with_context(|| format!("invalid payload path {}", source.display()))?;
            let target = match entry.destination() {
                Some(into) => fs::join_inside(&java_dir, into).join(file_name),
                None => java_dir.join(file_name),
            };
            log::debug!("Copying {} to {}", source.display(), target.display());
            fs::copy_path(&source, &target).await?;
        }

        self.set_application_file_permissions(&destination).await
    }

    /// Grants read on everything, then execute on every directory.
    pub async fn set_application_file_permissions(&self, destination: &Path) -> Result<()> {
        let path = destination.display().to_string();

        let read = vec!["-R".to_string(), "a+r".to_string(), path.clone()];
        run_checked(&self.executor, "chmod", "chmod", &read, None).await?;

        let mut traverse = vec![path];
        if destination.is_dir() {
            traverse.extend(["-type".to_string(), "d".to_string()]);
        }
        traverse.extend(
            ["-exec", "chmod", "a+x", "{}", ";"]
                .iter()
                .map(|s| s.to_string()),
        );
        run_checked(&self.executor, "find", "find", &traverse, None).await?;

        Ok(())
    }

    /// Resolves the `icns` application icon into the build directory.
    pub fn application_icon(&self) -> Result<PathBuf> {
        self.setup.resolve_icon(&self.task.build_dir, "icns")
    }

    /// Identifier of the bundle being assembled.
    pub fn identifier(&self) -> &str {
        &self.bundle.identifier
    }

    /// Path of the `.app` directory.
    pub fn bundle_path(&self) -> PathBuf {
        self.bundle.bundle_path()
    }

    /// The collected bundle description.
    pub fn bundle(&self) -> &AppBundlerTask {
        &self.bundle
    }

    pub fn setup(&self) -> &'a SetupConfiguration {
        self.setup
    }

    pub fn task(&self) -> &'a SetupTask {
        self.task
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn project_path(&self, path: &Path) -> PathBuf {
        path.absolutize_from(&self.setup.project().dir)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| self.setup.project().dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::ProjectMetadata;

    #[test]
    fn short_version_stops_before_second_separator() {
        assert_eq!(short_version("1.2.3.4"), "1.2");
        assert_eq!(short_version("1.2"), "1.2");
        assert_eq!(short_version("1"), "1");
        assert_eq!(short_version("2.0.1"), "2.0");
        assert_eq!(short_version("10.20.30-beta"), "10.20");
    }

    #[test]
    fn identifier_appends_sanitized_display_name() {
        let mut setup = SetupConfiguration::new(ProjectMetadata::new("demo", "/work"));
        setup.set_application("Report Suite");
        setup.set_app_identifier("com.example.reports");

        assert_eq!(bundle_identifier(&setup, "Report Suite"), "com.example.reports");
        assert_eq!(
            bundle_identifier(&setup, "Report Server (x64)"),
            "com.example.reports.ReportServerx64"
        );
    }

    #[test]
    fn bundle_names_must_stay_inside_the_build_dir() {
        for name in ["", ".", "..", "../../Evil", "a/b", "/abs"] {
            let err = validate_bundle_name("display name", name).unwrap_err();
            assert!(err.is_configuration(), "{name:?}");
        }
        validate_bundle_name("display name", "Report Designer").unwrap();
        validate_bundle_name("display name", "..Reports..").unwrap();
    }
}
