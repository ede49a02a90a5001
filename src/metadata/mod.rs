//! Setup manifest loading from `setup.toml`.
//!
//! ```toml
//! [project]
//! name = "reports"
//! version = "2.0.1"
//!
//! [setup]
//! vendor = "Example Inc."
//! application = "Report Suite"
//! icons = "assets/reports.icns"
//! bundle_jre = "17"
//! main_class = "com.example.Main"
//! main_jar = "reports.jar"
//!
//! [[application]]
//! display_name = "Report Designer"
//!
//! [[service]]
//! display_name = "Report Server"
//! keep_alive = true
//!
//! [dmg]
//! architecture = ["arm64"]
//! payload = ["build/libs", { from = "docs", into = "help" }]
//! prefpane_template = "templates/prefpane"
//!
//! [[dmg.preferences_links]]
//! title = "Open Console"
//! action = "http://localhost:9000"
//!
//! [scripts]
//! postinst = ["launchctl load /Library/LaunchDaemons/com.example.plist"]
//! ```

use crate::bundler::settings::{
    Application, CodeSignSettings, DmgSettings, LifecycleScripts, PayloadEntry, PreferencesLink,
    ProjectMetadata, Service, SetupConfiguration, SetupFields, SetupTask, TaskKind,
};
use crate::error::{BundlerError, CliError, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// The task consuming the assembled bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Tool {
    /// Disk image; the only tool using the image options of `[dmg]`.
    Dmg,
    /// Installer package.
    Pkg,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Dmg => "dmg",
            Tool::Pkg => "pkg",
        }
    }
}

/// Task options of the `[dmg]` section.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct TaskSection {
    #[serde(flatten)]
    pub image: DmgSettings,
    pub preferences_links: Vec<PreferencesLink>,
    pub code_sign: Option<CodeSignSettings>,
    pub payload: Vec<PayloadEntry>,
    pub launcher: Option<PathBuf>,
    pub prefpane_template: Option<PathBuf>,
    pub prefpane_template_root: String,
}

#[derive(serde::Deserialize)]
struct RawManifest {
    project: ProjectMetadata,
    #[serde(default)]
    setup: SetupFields,
    #[serde(default, rename = "application")]
    applications: Vec<Application>,
    #[serde(default, rename = "service")]
    services: Vec<Service>,
    #[serde(default)]
    dmg: TaskSection,
    #[serde(default)]
    scripts: LifecycleScripts,
}

/// A loaded setup manifest.
#[derive(Debug, Clone)]
pub struct SetupManifest {
    pub setup: SetupConfiguration,
    pub applications: Vec<Application>,
    pub services: Vec<Service>,
    pub task: TaskSection,
    pub scripts: LifecycleScripts,
}

impl SetupManifest {
    /// Builds the [`SetupTask`] for `tool`.
    ///
    /// Bundles are placed in `build_dir` if given, otherwise in
    /// `<project build dir>/<tool>`.
    pub fn task(&self, tool: Tool, build_dir: Option<&Path>) -> SetupTask {
        let project = self.setup.project();
        let build_dir = match build_dir {
            Some(dir) => dir
                .absolutize_from(&project.dir)
                .map(|p| p.into_owned())
                .unwrap_or_else(|_| dir.to_path_buf()),
            None => project.build_dir().join(tool.name()),
        };
        let kind = match tool {
            Tool::Dmg => TaskKind::Dmg(self.task.image.clone()),
            Tool::Pkg => TaskKind::Pkg,
        };

        let mut task = SetupTask::new(kind, build_dir);
        task.payload = self.task.payload.clone();
        task.launcher = self.task.launcher.clone();
        task.preferences_links = self.task.preferences_links.clone();
        task.code_sign = self.task.code_sign.clone();
        task.prefpane_template = self.task.prefpane_template.clone();
        task.prefpane_template_root = self.task.prefpane_template_root.clone();
        task.scripts = self.scripts.clone();
        task
    }
}

/// Parses a manifest; a relative project directory resolves against
/// `base_dir`.
pub fn parse_manifest(text: &str, base_dir: &Path) -> Result<SetupManifest> {
    let mut raw: RawManifest = toml::from_str(text)?;

    raw.project.dir = raw
        .project
        .dir
        .absolutize_from(base_dir)
        .map(|p| p.into_owned())?;

    Ok(SetupManifest {
        setup: SetupConfiguration::with_fields(raw.project, raw.setup),
        applications: raw.applications,
        services: raw.services,
        task: raw.dmg,
        scripts: raw.scripts,
    })
}

/// Loads `setup.toml`; relative paths resolve against its directory.
pub fn load_manifest(path: &Path) -> Result<SetupManifest> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "read_setup_manifest".to_string(),
            reason: format!("Failed to read {}: {}", path.display(), e),
        })
    })?;

    let base_dir = path
        .absolutize()
        .map(|p| p.into_owned())?
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    parse_manifest(&text, &base_dir)
}
