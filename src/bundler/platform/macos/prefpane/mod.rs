//! Preference panes for background services.
//!
//! A pane is built in two stages around the service's application bundle:
//!
//! - Stage A, before the bundle is assembled: [`PrefPaneOrchestrator::init`]
//!   materializes the source template into a private working directory and
//!   returns the [`PipelineState`]; [`PrefPaneOrchestrator::build`] runs the
//!   nested build on it.
//! - Stage B, after the bundle exists: [`PrefPaneOrchestrator::create`]
//!   moves the compiled pane into the bundle, patches its manifests, removes
//!   the working directory and finally signs the pane.

pub mod nested;
pub mod patch;
pub mod template;

pub use nested::{GradleBuild, NESTED_BUILD_TASKS, NestedBuild};
pub use patch::{ServiceDescriptor, info_plist_patch, service_plist_patch, starter_ops};
pub use template::{
    DirectoryTemplateStore, PLACEHOLDER, ReplacingReader, Substitutions, TemplateStore,
    ZipTemplateStore, materialize,
};

use super::{
    app::{BundleAssembler, validate_bundle_name},
    plist::PlistApplier,
    sign::CodeSigner,
};
use crate::bundler::{
    error::{Context, Error, Result},
    process::ProcessExecutor,
    settings::{Service, SetupConfiguration, SetupTask},
    utils::{alphanumeric, fs},
};
use std::path::{Path, PathBuf};

/// State produced by [`PrefPaneOrchestrator::init`] and consumed by the
/// later steps of the same pipeline.
///
/// The working directory belongs to exactly one pipeline and is deleted by
/// [`PrefPaneOrchestrator::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineState {
    work_dir: PathBuf,
    template_dir: PathBuf,
}

impl PipelineState {
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Root of the materialized template.
    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Build descriptor of the nested build.
    pub fn build_file(&self) -> PathBuf {
        self.template_dir.join("build.gradle")
    }
}

/// The assembled bundle a pane is embedded into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneHost {
    /// The `.app` directory.
    pub bundle: PathBuf,
    /// Bundle identifier; the pane's identifier is derived from it.
    pub identifier: String,
    /// Resolved `icns` application icon.
    pub icon: PathBuf,
}

impl PaneHost {
    /// Describes the bundle produced by `assembler`.
    pub fn of<E: ProcessExecutor>(assembler: &BundleAssembler<'_, E>) -> Result<Self> {
        let icon = match &assembler.bundle().icon {
            Some(icon) => icon.clone(),
            None => assembler.application_icon()?,
        };
        Ok(Self {
            bundle: assembler.bundle_path(),
            identifier: assembler.identifier().to_string(),
            icon,
        })
    }
}

/// Builds and embeds the preference pane of one service.
pub struct PrefPaneOrchestrator<'a, P, N, S> {
    setup: &'a SetupConfiguration,
    task: &'a SetupTask,
    service: &'a Service,
    applier: P,
    nested: N,
    signer: S,
    display_name: String,
    internal_name: String,
    work_root: PathBuf,
}

impl<'a, P, N, S> PrefPaneOrchestrator<'a, P, N, S>
where
    P: PlistApplier,
    N: NestedBuild,
    S: CodeSigner,
{
    pub fn new(
        setup: &'a SetupConfiguration,
        task: &'a SetupTask,
        service: &'a Service,
        applier: P,
        nested: N,
        signer: S,
    ) -> Self {
        let display_name = service.display_name(setup).to_string();
        let internal_name = alphanumeric(&display_name);
        Self {
            setup,
            task,
            service,
            applier,
            nested,
            signer,
            display_name,
            internal_name,
            work_root: task.build_dir.join("tmp").join("prefpane"),
        }
    }

    /// Places working directories below `dir` instead of the build directory.
    pub fn with_work_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_root = dir.into();
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Display name reduced to letters and digits.
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    /// Stage A init: materializes the template with the placeholder replaced
    /// by the internal name.
    pub async fn init<T: TemplateStore + ?Sized>(&self, templates: &T) -> Result<PipelineState> {
        validate_bundle_name("service name", &self.display_name)?;
        if self.internal_name.is_empty() {
            return Err(Error::Configuration(format!(
                "service name '{}' has no letters or digits to derive a preference pane name from",
                self.display_name
            )));
        }

        let work_dir = self.work_root.join(&self.internal_name);
        fs::create_dir_all(&work_dir, true).await?;

        let substitutions = Substitutions::new().with(PLACEHOLDER, &self.internal_name);
        materialize(templates, &substitutions, &work_dir)
            .with_context(|| format!("unpacking preference pane template for {}", self.display_name))?;

        log::info!("Unpacked preference pane sources to {}", work_dir.display());
        Ok(PipelineState {
            template_dir: work_dir.clone(),
            work_dir,
        })
    }

    /// Stage A build: compiles the pane with the nested build.
    pub async fn build(&self, state: &PipelineState) -> Result<()> {
        self.nested.run(&state.build_file(), &NESTED_BUILD_TASKS).await
    }

    /// Path the nested build leaves the compiled pane at.
    pub fn artifact_path(&self, state: &PipelineState) -> PathBuf {
        state
            .template_dir
            .join("build/sym/Release")
            .join(format!("{}.prefPane", self.internal_name))
    }

    /// Where the pane ends up inside `host`.
    pub fn destination(&self, host: &PaneHost) -> PathBuf {
        host.bundle
            .join("Contents/Resources")
            .join(format!("{}.prefPane", self.display_name))
    }

    /// Stage B: relocates, patches and signs the pane. Returns its final path.
    ///
    /// Every step aborts the rest on failure; patches already applied stay
    /// applied.
    pub async fn create(&self, state: PipelineState, host: &PaneHost) -> Result<PathBuf> {
        let artifact = self.artifact_path(&state);
        if !artifact.exists() {
            return Err(Error::MissingArtifact { path: artifact });
        }

        let pane = self.destination(host);
        fs::move_path(&artifact, &pane).await?;
        log::info!("Moved the preference pane to {}", pane.display());

        let contents = pane.join("Contents");
        fs::copy_file(&host.icon, &contents.join("Resources/ProductIcon.icns")).await?;

        let info = info_plist_patch(
            contents.join("Info.plist"),
            &host.identifier,
            &self.display_name,
            &self.internal_name,
        );
        self.applier.apply(&info).await?;

        let descriptor = ServiceDescriptor {
            name: self.display_name.clone(),
            label: self.service.id(self.setup).to_string(),
            description: self.service.description(self.setup).to_string(),
            version: self.setup.version().to_string(),
            keep_alive: self.service.keep_alive,
            run_at_boot: self.service.start_on_boot,
            daemon_user: self.service.daemon_user().to_string(),
        };
        let service = service_plist_patch(
            contents.join("Resources/service.plist"),
            &descriptor,
            &self.task.preferences_links,
        );
        self.applier.apply(&service).await?;

        fs::remove_dir_all(&state.work_dir).await?;

        if let Some(settings) = &self.task.code_sign {
            self.signer.sign(&pane, settings).await?;
        }

        Ok(pane)
    }
}
