//! macOS setup assembly.
//!
//! Turns a declarative setup (global metadata, applications, services) into
//! application bundles with embedded runtimes and service preference panes.
//!
//! # Overview
//!
//! - [`settings`]: the configuration model with its default chains and the
//!   lifecycle script registry
//! - [`platform::macos`]: the bundle assembler and the preference pane
//!   pipeline
//! - [`builder`]: the [`Bundler`] driving all of it for one setup task
//! - [`process`]: the seam every external tool is invoked through
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_setup::bundler::Bundler;
//! use kodegen_bundler_setup::metadata::{Tool, load_manifest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = load_manifest("setup.toml".as_ref())?;
//! let task = manifest.task(Tool::Pkg, None);
//! let bundler = Bundler::new(manifest, task).await?;
//!
//! for artifact in bundler.bundle().await? {
//!     println!("Created {} at {}", artifact.kind, artifact.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod platform;
pub mod process;
pub mod settings;
pub mod utils;

pub use builder::{Bundler, Collaborators, run_pipeline};
pub use error::{Error, Result};
pub use settings::{
    Application, Arch, CodeSignSettings, DmgSettings, DocumentRole, DocumentType, IconSpec,
    LifecycleScripts, PayloadEntry, PreferencesLink, ProjectMetadata, RuntimeSpec, ScriptHook,
    Service, SetupConfiguration, SetupFields, SetupTask, TaskKind,
};

use std::fmt;
use std::path::PathBuf;

/// What an assembled artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A `.app` bundle.
    Application,
    /// A `.prefPane` embedded in a service bundle.
    PreferencePane,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Application => f.write_str("application bundle"),
            ArtifactKind::PreferencePane => f.write_str("preference pane"),
        }
    }
}

/// A bundle produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledArtifact {
    pub kind: ArtifactKind,
    /// Display name of the application or service it belongs to.
    pub name: String,
    pub path: PathBuf,
}
