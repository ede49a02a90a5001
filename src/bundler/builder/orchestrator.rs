//! Main setup orchestration.
//!
//! [`run_pipeline`] assembles every application and service of a setup in
//! declaration order. Each service runs a linear chain:
//! template init, nested build, service bundle, pane relocation. No step of
//! one chain starts before the previous one finished.

use crate::bundler::{
    ArtifactKind, AssembledArtifact, Error, Result,
    error::Context,
    platform::macos::{
        BundleAssembler, CodeSigner, DeveloperIdSigner, PaneHost, PlistApplier, PlistBuddy,
        PrefPaneOrchestrator,
        prefpane::{DirectoryTemplateStore, GradleBuild, NestedBuild, TemplateStore, ZipTemplateStore},
    },
    process::{ProcessExecutor, TokioExecutor},
    settings::{Application, Service, SetupConfiguration, SetupTask},
};
use crate::metadata::SetupManifest;
use path_absolutize::Absolutize;
use std::io::Read;
use std::path::Path;

use super::tool_detection::{HAS_JAVA_HOME, HAS_PLIST_BUDDY};

/// The external collaborators a pipeline talks to.
#[derive(Debug, Clone)]
pub struct Collaborators<E, P, N, S> {
    pub executor: E,
    pub applier: P,
    pub nested: N,
    pub signer: S,
}

/// Collaborators backed by real processes.
pub type SystemCollaborators = Collaborators<
    TokioExecutor,
    PlistBuddy<TokioExecutor>,
    GradleBuild<TokioExecutor>,
    DeveloperIdSigner,
>;

impl SystemCollaborators {
    pub fn system() -> Self {
        Self {
            executor: TokioExecutor,
            applier: PlistBuddy::new(TokioExecutor),
            nested: GradleBuild::new(TokioExecutor),
            signer: DeveloperIdSigner,
        }
    }
}

/// Assembles every application, then every service with its preference pane.
///
/// `templates` is only read when there are services.
pub async fn run_pipeline<E, P, N, S, T>(
    setup: &SetupConfiguration,
    task: &SetupTask,
    applications: &[Application],
    services: &[Service],
    templates: Option<&T>,
    collaborators: &Collaborators<E, P, N, S>,
) -> Result<Vec<AssembledArtifact>>
where
    E: ProcessExecutor,
    P: PlistApplier,
    N: NestedBuild,
    S: CodeSigner,
    T: TemplateStore + ?Sized,
{
    let templates = match templates {
        Some(templates) => Some(templates),
        None if services.is_empty() => None,
        None => {
            return Err(Error::Configuration(
                "services need a preference pane template; set 'prefpane_template' in the \
                 task section"
                    .into(),
            ));
        }
    };

    let mut artifacts = Vec::new();

    for application in applications {
        let mut assembler = BundleAssembler::new(setup, task, &collaborators.executor);
        let path = assembler.assemble(application).await?;
        artifacts.push(AssembledArtifact {
            kind: ArtifactKind::Application,
            name: application.display_name(setup).to_string(),
            path,
        });
    }

    for service in services {
        let Some(templates) = templates else { break };
        let name = service.display_name(setup).to_string();
        let pane = PrefPaneOrchestrator::new(
            setup,
            task,
            service,
            &collaborators.applier,
            &collaborators.nested,
            &collaborators.signer,
        );

        // Stage A
        let state = pane.init(templates).await?;
        pane.build(&state)
            .await
            .with_context(|| format!("building the preference pane of {name}"))?;

        let mut assembler = BundleAssembler::new(setup, task, &collaborators.executor);
        let bundle = assembler.assemble(&service.application).await?;
        artifacts.push(AssembledArtifact {
            kind: ArtifactKind::Application,
            name: name.clone(),
            path: bundle,
        });

        // Stage B
        let host = PaneHost::of(&assembler)?;
        let path = pane.create(state, &host).await?;
        artifacts.push(AssembledArtifact {
            kind: ArtifactKind::PreferencePane,
            name,
            path,
        });
    }

    Ok(artifacts)
}

/// A template read from a directory or from a zip archive.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Directory(DirectoryTemplateStore),
    Zip(ZipTemplateStore),
}

impl TemplateSource {
    /// Picks the store by looking at `path`: directories are read as is,
    /// files as zip archives below `root`.
    pub fn locate(path: &Path, root: &str) -> Result<Self> {
        if path.is_dir() {
            Ok(Self::Directory(DirectoryTemplateStore::new(path)))
        } else if path.is_file() {
            Ok(Self::Zip(ZipTemplateStore::new(path, root)))
        } else {
            Err(Error::Configuration(format!(
                "preference pane template {} does not exist",
                path.display()
            )))
        }
    }
}

impl TemplateStore for TemplateSource {
    fn manifest(&self) -> Result<Vec<String>> {
        match self {
            TemplateSource::Directory(store) => store.manifest(),
            TemplateSource::Zip(store) => store.manifest(),
        }
    }

    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>> {
        match self {
            TemplateSource::Directory(store) => store.open(name),
            TemplateSource::Zip(store) => store.open(name),
        }
    }
}

/// Main setup orchestrator.
///
/// Owns a loaded manifest and the task to build, and keeps the temporary
/// signing keychain (macOS) alive for all signing operations.
pub struct Bundler {
    manifest: SetupManifest,
    task: SetupTask,
    #[cfg(target_os = "macos")]
    _temp_keychain: Option<kodegen_bundler_sign::macos::TempKeychain>,
}

impl std::fmt::Debug for Bundler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug_struct = f.debug_struct("Bundler");
        debug_struct.field("task", &self.task);
        #[cfg(target_os = "macos")]
        debug_struct.field(
            "_temp_keychain",
            &self._temp_keychain.as_ref().map(|_| "<TempKeychain>"),
        );
        debug_struct.finish()
    }
}

impl Bundler {
    /// Creates a bundler for `task`.
    ///
    /// A certificate in the environment is imported only when the task
    /// signs anything.
    pub async fn new(manifest: SetupManifest, task: SetupTask) -> Result<Self> {
        #[cfg(target_os = "macos")]
        let _temp_keychain = if task.code_sign.is_some() {
            super::signing::setup_macos_signing().await?
        } else {
            None
        };

        Ok(Self {
            manifest,
            task,
            #[cfg(target_os = "macos")]
            _temp_keychain,
        })
    }

    pub fn task(&self) -> &SetupTask {
        &self.task
    }

    pub fn manifest(&self) -> &SetupManifest {
        &self.manifest
    }

    /// Assembles everything with the system tools.
    pub async fn bundle(&self) -> Result<Vec<AssembledArtifact>> {
        self.bundle_with(&SystemCollaborators::system()).await
    }

    /// Assembles everything with the given collaborators.
    pub async fn bundle_with<E, P, N, S>(
        &self,
        collaborators: &Collaborators<E, P, N, S>,
    ) -> Result<Vec<AssembledArtifact>>
    where
        E: ProcessExecutor,
        P: PlistApplier,
        N: NestedBuild,
        S: CodeSigner,
    {
        let setup = &self.manifest.setup;
        self.report_missing_tools();

        log::info!(
            "Assembling {} ({} task, {} applications, {} services)",
            setup.archive_name(),
            self.task.kind.name(),
            self.manifest.applications.len(),
            self.manifest.services.len()
        );
        for hook in crate::bundler::ScriptHook::ALL {
            let fragments = self.task.scripts.get(hook).len();
            if fragments > 0 {
                log::debug!("{} {} script fragments registered", fragments, hook);
            }
        }

        let templates = match (&self.task.prefpane_template, self.manifest.services.is_empty()) {
            (Some(path), false) => {
                let path = path
                    .absolutize_from(&setup.project().dir)
                    .map(|p| p.into_owned())
                    .unwrap_or_else(|_| path.clone());
                Some(TemplateSource::locate(&path, &self.task.prefpane_template_root)?)
            }
            _ => None,
        };

        run_pipeline(
            setup,
            &self.task,
            &self.manifest.applications,
            &self.manifest.services,
            templates.as_ref(),
            collaborators,
        )
        .await
    }

    fn report_missing_tools(&self) {
        if !self.manifest.services.is_empty() && !*HAS_PLIST_BUDDY {
            log::warn!("PlistBuddy not found; preference pane manifests cannot be patched");
        }
        let has_runtime_version = self
            .manifest
            .setup
            .bundle_jre()
            .is_some_and(|spec| spec.local_dir(&self.manifest.setup.project().dir).is_none());
        if has_runtime_version && !*HAS_JAVA_HOME {
            log::warn!("java_home not found; runtime versions cannot be resolved");
        }
    }
}
