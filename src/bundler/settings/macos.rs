//! macOS task settings: image options, payload, signing.

use super::{Arch, LifecycleScripts, PreferencesLink};
use std::path::PathBuf;

/// Options only the disk image task supplies.
///
/// ```toml
/// [dmg]
/// architecture = ["arm64", "x86_64"]
/// native_libraries = ["native/macos"]
/// jre_includes = ["bin/**", "lib/**"]
/// jre_excludes = ["lib/src.zip"]
/// ```
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DmgSettings {
    /// Preferred launch architectures, first entry preferred.
    pub architecture: Vec<Arch>,

    /// Native library files or directories placed next to the launcher.
    pub native_libraries: Vec<PathBuf>,

    /// Glob patterns (relative to the runtime root) to embed.
    ///
    /// Empty means the whole runtime.
    pub jre_includes: Vec<String>,

    /// Glob patterns (relative to the runtime root) to leave out.
    pub jre_excludes: Vec<String>,
}

/// Code signing configuration.
///
/// ```toml
/// [dmg.code_sign]
/// identity = "Developer ID Application: Example Inc. (TEAMID)"
/// entitlements = "entitlements.plist"
/// ```
#[derive(Clone, Debug, serde::Deserialize)]
pub struct CodeSignSettings {
    /// Signing identity name. `"-"` requests an ad-hoc signature.
    pub identity: String,

    /// Path to entitlements.plist for code signing.
    #[serde(default)]
    pub entitlements: Option<PathBuf>,

    /// Sign with the hardened runtime.
    ///
    /// Default: true
    #[serde(default = "default_true")]
    pub hardened_runtime: bool,
}

fn default_true() -> bool {
    true
}

/// A file or directory copied into `Contents/Java`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum PayloadEntry {
    /// Copied to the root of `Contents/Java`.
    Path(PathBuf),
    /// Copied into a sub directory of `Contents/Java`.
    Into {
        from: PathBuf,
        into: PathBuf,
    },
}

impl PayloadEntry {
    pub fn source(&self) -> &PathBuf {
        match self {
            PayloadEntry::Path(path) => path,
            PayloadEntry::Into { from, .. } => from,
        }
    }

    pub fn destination(&self) -> Option<&PathBuf> {
        match self {
            PayloadEntry::Path(_) => None,
            PayloadEntry::Into { into, .. } => Some(into),
        }
    }
}

/// The kind of task consuming the assembled bundle.
#[derive(Clone, Debug)]
pub enum TaskKind {
    /// The disk image task; the only one supplying image options.
    Dmg(DmgSettings),
    /// An installer package task; uses built-in defaults.
    Pkg,
}

impl TaskKind {
    /// Image options when this is the disk image task.
    pub fn image(&self) -> Option<&DmgSettings> {
        match self {
            TaskKind::Dmg(settings) => Some(settings),
            TaskKind::Pkg => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::Dmg(_) => "dmg",
            TaskKind::Pkg => "pkg",
        }
    }
}

/// A setup task: what to build, where, and with which extras.
#[derive(Clone, Debug)]
pub struct SetupTask {
    pub kind: TaskKind,

    /// Directory bundles are assembled in.
    pub build_dir: PathBuf,

    /// Files copied into every bundle's `Contents/Java`.
    pub payload: Vec<PayloadEntry>,

    /// Native launcher stub copied to `Contents/MacOS/<executable>`.
    ///
    /// A shell launcher is generated when unset.
    pub launcher: Option<PathBuf>,

    /// Actions offered by service preference panes, in display order.
    pub preferences_links: Vec<PreferencesLink>,

    pub code_sign: Option<CodeSignSettings>,

    /// Preference pane source template: a directory or a zip archive.
    pub prefpane_template: Option<PathBuf>,

    /// Sub tree of a zip template holding the sources.
    pub prefpane_template_root: String,

    /// Install/uninstall hook fragments for packaging backends.
    pub scripts: LifecycleScripts,
}

impl SetupTask {
    pub fn new(kind: TaskKind, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            build_dir: build_dir.into(),
            payload: Vec::new(),
            launcher: None,
            preferences_links: Vec::new(),
            code_sign: None,
            prefpane_template: None,
            prefpane_template_root: String::new(),
            scripts: LifecycleScripts::new(),
        }
    }
}
