//! Icon configuration and per-format resolution.

use crate::bundler::error::{Error, ErrorExt, Result};
use path_absolutize::Absolutize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Icons configured for a setup.
///
/// Accepted shapes in `setup.toml`:
///
/// ```toml
/// icons = "assets/app.icns"                         # single file
/// icons = ["assets/app.icns", "assets/app.ico"]     # several files
/// icons = { icns = "mac/app.icns", ico = "win/app.ico" }  # per platform format
/// ```
///
/// The pipeline never inspects the variant; it only calls [`IconSpec::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum IconSpec {
    /// A single icon file.
    Single(PathBuf),
    /// Several icon files in different formats.
    List(Vec<PathBuf>),
    /// Explicit file per format, keyed by extension.
    PerFormat(BTreeMap<String, PathBuf>),
}

impl IconSpec {
    /// Candidate files that provide `format`, in configuration order.
    fn candidates(&self, format: &str) -> Vec<&Path> {
        let has_format = |path: &&PathBuf| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(format))
        };

        match self {
            IconSpec::Single(path) => std::iter::once(path)
                .filter(has_format)
                .map(PathBuf::as_path)
                .collect(),
            IconSpec::List(paths) => paths
                .iter()
                .filter(has_format)
                .map(PathBuf::as_path)
                .collect(),
            IconSpec::PerFormat(map) => map
                .iter()
                .filter(|(key, _)| key.eq_ignore_ascii_case(format))
                .map(|(_, path)| path.as_path())
                .collect(),
        }
    }

    /// Resolves the icon for `format` and copies it into `target_dir`.
    ///
    /// Relative paths resolve against `base_dir`. Returns the path of the
    /// copy inside `target_dir`.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if no configured icon provides `format` or
    /// the configured file does not exist.
    pub fn resolve(&self, base_dir: &Path, target_dir: &Path, format: &str) -> Result<PathBuf> {
        let source = self
            .candidates(format)
            .into_iter()
            .map(|path| path.absolutize_from(base_dir).map(|p| p.into_owned()))
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "no '*.{format}' icon available; configured icons: {self:?}"
                ))
            })?;

        let file_name = source
            .file_name()
            .ok_or_else(|| Error::Configuration(format!("invalid icon path {}", source.display())))?;
        let target = target_dir.join(file_name);

        if target != source {
            std::fs::create_dir_all(target_dir).fs_context("creating icon directory", target_dir)?;
            std::fs::copy(&source, &target).fs_context("copying icon", &target)?;
        }

        log::debug!("Resolved {} icon: {}", format, target.display());
        Ok(target)
    }
}
