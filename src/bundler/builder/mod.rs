//! Setup orchestration and coordination.
//!
//! This module provides the [`Bundler`] that drives the assembly of every
//! application and service of a loaded setup.
//!
//! # Overview
//!
//! The bundler:
//! 1. Reads the loaded [`SetupManifest`](crate::metadata::SetupManifest)
//! 2. Imports a signing certificate when the task signs anything
//! 3. Assembles application bundles in declaration order
//! 4. Builds, embeds and signs one preference pane per service
//! 5. Returns [`AssembledArtifact`](crate::bundler::AssembledArtifact) results
//!
//! # Module Organization
//!
//! - [`orchestrator`] - Main [`Bundler`] struct and [`run_pipeline`]
//! - [`signing`] - Code signing setup (macOS keychain management)
//! - [`tool_detection`] - External tool availability checking

pub mod orchestrator;
pub mod signing;
pub mod tool_detection;

pub use orchestrator::{Bundler, Collaborators, SystemCollaborators, TemplateSource, run_pipeline};
