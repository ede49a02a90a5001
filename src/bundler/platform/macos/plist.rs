//! Key-path patching of existing property list files.
//!
//! A patch is an ordered list of [`PlistOp`]s collected in memory and then
//! handed to a [`PlistApplier`]. The production applier runs one
//! `PlistBuddy -c "<command>" <file>` invocation per operation, never
//! batched, so a failure leaves every earlier mutation applied.

use crate::bundler::{
    error::Result,
    process::{ProcessExecutor, run_checked},
};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Location of the PlistBuddy tool on macOS.
pub const PLIST_BUDDY: &str = "/usr/libexec/PlistBuddy";

/// Value types understood by `Add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlistType {
    String,
    Bool,
    Integer,
    Array,
    Dict,
}

impl PlistType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlistType::String => "string",
            PlistType::Bool => "bool",
            PlistType::Integer => "integer",
            PlistType::Array => "array",
            PlistType::Dict => "dict",
        }
    }
}

/// A single atomic key-path mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlistOp {
    /// Replace the value of an existing key.
    Set { key: String, value: String },
    /// Create a key of the given type; containers take no value.
    Add {
        key: String,
        kind: PlistType,
        value: Option<String>,
    },
    /// Remove a key and everything below it.
    Delete { key: String },
}

impl PlistOp {
    pub fn key(&self) -> &str {
        match self {
            PlistOp::Set { key, .. } | PlistOp::Add { key, .. } | PlistOp::Delete { key } => key,
        }
    }

    /// The PlistBuddy command string for this operation.
    pub fn command(&self) -> String {
        match self {
            PlistOp::Set { key, value } => format!("Set {key} {value}"),
            PlistOp::Add {
                key,
                kind,
                value: Some(value),
            } => format!("Add {key} {} {value}", kind.as_str()),
            PlistOp::Add {
                key,
                kind,
                value: None,
            } => format!("Add {key} {}", kind.as_str()),
            PlistOp::Delete { key } => format!("Delete {key}"),
        }
    }
}

impl fmt::Display for PlistOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command())
    }
}

/// Ordered mutations of one property list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlistPatch {
    file: PathBuf,
    ops: Vec<PlistOp>,
}

impl PlistPatch {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            ops: Vec::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.ops.push(PlistOp::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn add(
        &mut self,
        key: impl Into<String>,
        kind: PlistType,
        value: impl Into<String>,
    ) -> &mut Self {
        self.ops.push(PlistOp::Add {
            key: key.into(),
            kind,
            value: Some(value.into()),
        });
        self
    }

    /// Adds an empty container (`array` or `dict`) at `key`.
    pub fn add_container(&mut self, key: impl Into<String>, kind: PlistType) -> &mut Self {
        self.ops.push(PlistOp::Add {
            key: key.into(),
            kind,
            value: None,
        });
        self
    }

    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(PlistOp::Delete { key: key.into() });
        self
    }

    pub fn extend(&mut self, ops: impl IntoIterator<Item = PlistOp>) -> &mut Self {
        self.ops.extend(ops);
        self
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn ops(&self) -> &[PlistOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Applies a [`PlistPatch`] to its file.
pub trait PlistApplier {
    /// Apply every operation in order; stop at the first failure.
    fn apply(&self, patch: &PlistPatch) -> impl Future<Output = Result<()>>;
}

impl<P: PlistApplier + ?Sized> PlistApplier for &P {
    fn apply(&self, patch: &PlistPatch) -> impl Future<Output = Result<()>> {
        (**self).apply(patch)
    }
}

/// Applies patches through `/usr/libexec/PlistBuddy`, one process per
/// operation.
#[derive(Debug, Clone)]
pub struct PlistBuddy<E> {
    executor: E,
    program: String,
}

impl<E: ProcessExecutor> PlistBuddy<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            program: PLIST_BUDDY.to_string(),
        }
    }

    /// Uses a PlistBuddy binary at a different location.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl<E: ProcessExecutor> PlistApplier for PlistBuddy<E> {
    async fn apply(&self, patch: &PlistPatch) -> Result<()> {
        let file = patch.file().display().to_string();
        log::debug!("Patching {} ({} operations)", file, patch.ops().len());

        for op in patch.ops() {
            let args = vec!["-c".to_string(), op.command(), file.clone()];
            run_checked(&self.executor, "PlistBuddy", &self.program, &args, None).await?;
        }
        Ok(())
    }
}
