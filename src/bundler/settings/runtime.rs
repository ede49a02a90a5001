//! Embedded runtime specification.

use path_absolutize::Absolutize;
use std::fmt;
use std::path::{Path, PathBuf};

/// The runtime to embed: either a directory holding an installed runtime or
/// a version string handed to the runtime locator.
///
/// Both forms are written the same way in `setup.toml`
/// (`bundle_jre = "17"` or `bundle_jre = "/opt/jdk-17"`); which one applies
/// is decided when the bundle is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSpec(String);

impl RuntimeSpec {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, used as version argument for the runtime locator.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interprets the spec as a directory relative to `base_dir`.
    ///
    /// Returns `None` if the path cannot be formed or is not a directory.
    pub fn local_dir(&self, base_dir: &Path) -> Option<PathBuf> {
        let path = Path::new(&self.0).absolutize_from(base_dir).ok()?;
        path.is_dir().then(|| path.into_owned())
    }
}

impl fmt::Display for RuntimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for RuntimeSpec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Integer(number) => Self(number.to_string()),
            Raw::Float(number) => Self(number.to_string()),
        })
    }
}
