//! Configuration structures for bundle assembly.
//!
//! This module provides the setup configuration model with its default
//! chains, per-application and per-service settings, lifecycle scripts and
//! the macOS task options.

mod application;
mod arch;
mod icon;
mod macos;
mod runtime;
mod scripts;
mod service;
mod setup;

// Re-export all public types
pub use application::{Application, DocumentRole, DocumentType};
pub use arch::Arch;
pub use icon::IconSpec;
pub use macos::{CodeSignSettings, DmgSettings, PayloadEntry, SetupTask, TaskKind};
pub use runtime::RuntimeSpec;
pub use scripts::{LifecycleScripts, ScriptHook};
pub use service::{PreferencesLink, SUPERUSER, Service};
pub use setup::{ProjectMetadata, SetupConfiguration, SetupFields, normalize_runtime_target};
