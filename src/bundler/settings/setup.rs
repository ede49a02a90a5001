//! Global setup metadata with layered defaults.

use super::{IconSpec, RuntimeSpec};
use crate::bundler::error::{Error, Result};
use chrono::Datelike;
use std::path::{Path, PathBuf};

/// Version reported by build tools when a project never declared one.
const UNSPECIFIED_VERSION: &str = "unspecified";

/// Ambient metadata of the project being packaged.
///
/// These values are not part of the setup configuration itself but feed its
/// default chains (application name, version, identifier).
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ProjectMetadata {
    /// Project name, the last fallback for names and identifiers.
    pub name: String,

    /// Project version as reported by the build, possibly `"unspecified"`.
    #[serde(default)]
    pub version: Option<String>,

    /// Base name of the project's archives.
    #[serde(default)]
    pub archives_base_name: Option<String>,

    /// Project directory; relative paths in the setup resolve against it.
    #[serde(default)]
    pub dir: PathBuf,

    /// Build directory; bundles and temporary trees are created below it.
    #[serde(default)]
    pub build_dir: Option<PathBuf>,
}

impl ProjectMetadata {
    /// Creates metadata for a project rooted at `dir`.
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            ..Default::default()
        }
    }

    /// Build directory, defaulting to `<dir>/build`.
    pub fn build_dir(&self) -> PathBuf {
        match &self.build_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.dir.join(dir),
            None => self.dir.join("build"),
        }
    }
}

/// Values set explicitly in the `[setup]` section.
///
/// Every field is optional; [`SetupConfiguration`] layers defaults on top.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct SetupFields {
    pub vendor: Option<String>,
    pub application: Option<String>,
    pub version: Option<String>,
    pub app_identifier: Option<String>,
    pub archive_name: Option<String>,
    pub icons: Option<IconSpec>,
    pub bundle_jre: Option<RuntimeSpec>,
    pub bundle_jre_target: Option<String>,
    pub main_class: Option<String>,
    pub main_jar: Option<String>,
    pub description: Option<String>,
    pub copyright: Option<String>,
}

/// The global setup configuration.
///
/// Every accessor is a pure function of the stored fields plus the ambient
/// [`ProjectMetadata`]; none of them ever fails. Whether a value is
/// *required* is decided by the consumer (see the bundle assembler).
#[derive(Debug, Clone, Default)]
pub struct SetupConfiguration {
    project: ProjectMetadata,
    fields: SetupFields,
}

impl SetupConfiguration {
    /// Creates an empty configuration for the given project.
    pub fn new(project: ProjectMetadata) -> Self {
        Self {
            project,
            fields: SetupFields::default(),
        }
    }

    /// Creates a configuration from explicitly set fields.
    pub fn with_fields(project: ProjectMetadata, mut fields: SetupFields) -> Self {
        fields.bundle_jre_target = fields
            .bundle_jre_target
            .map(|target| normalize_runtime_target(&target));
        Self { project, fields }
    }

    /// The ambient project metadata.
    pub fn project(&self) -> &ProjectMetadata {
        &self.project
    }

    /// Vendor of this setup, `"My Company"` if not set.
    pub fn vendor(&self) -> &str {
        self.fields.vendor.as_deref().unwrap_or("My Company")
    }

    pub fn set_vendor(&mut self, vendor: impl Into<String>) {
        self.fields.vendor = Some(vendor.into());
    }

    /// Name of the application, defaulting to the project name.
    pub fn application(&self) -> &str {
        self.fields
            .application
            .as_deref()
            .unwrap_or(&self.project.name)
    }

    pub fn set_application(&mut self, application: impl Into<String>) {
        self.fields.application = Some(application.into());
    }

    /// Version of the setup.
    ///
    /// An explicit version wins. Otherwise the project version is used unless
    /// it is the `"unspecified"` placeholder (any letter case), in which case
    /// `"1.0"` is returned.
    pub fn version(&self) -> &str {
        if let Some(version) = &self.fields.version {
            return version;
        }
        match &self.project.version {
            Some(version) if !version.eq_ignore_ascii_case(UNSPECIFIED_VERSION) => version,
            _ => "1.0",
        }
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.fields.version = Some(version.into());
    }

    /// Short application identifier, falling back to the archive base name
    /// and then to the project name.
    pub fn app_identifier(&self) -> &str {
        self.fields
            .app_identifier
            .as_deref()
            .or(self.project.archives_base_name.as_deref())
            .unwrap_or(&self.project.name)
    }

    pub fn set_app_identifier(&mut self, identifier: impl Into<String>) {
        self.fields.app_identifier = Some(identifier.into());
    }

    /// File name of the setup without extension, `<appIdentifier>-<version>`
    /// if not set.
    pub fn archive_name(&self) -> String {
        match &self.fields.archive_name {
            Some(name) => name.clone(),
            None => format!("{}-{}", self.app_identifier(), self.version()),
        }
    }

    pub fn set_archive_name(&mut self, name: impl Into<String>) {
        self.fields.archive_name = Some(name.into());
    }

    /// The configured icon specification, if any.
    pub fn icons(&self) -> Option<&IconSpec> {
        self.fields.icons.as_ref()
    }

    pub fn set_icons(&mut self, icons: IconSpec) {
        self.fields.icons = Some(icons);
    }

    /// Resolves the icon in `format` (e.g. `"icns"`) and materializes it
    /// inside `target_dir`.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if no icon is configured or none of the
    /// configured icons is available in the requested format.
    pub fn resolve_icon(&self, target_dir: &Path, format: &str) -> Result<PathBuf> {
        let icons = self.fields.icons.as_ref().ok_or_else(|| {
            Error::Configuration(format!(
                "You have to specify a valid icon file. Please set 'icons' in the [setup] \
                 section to an existing '*.{format}' file."
            ))
        })?;
        icons.resolve(&self.project.dir, target_dir, format)
    }

    /// Runtime to embed into the bundle, if any.
    pub fn bundle_jre(&self) -> Option<&RuntimeSpec> {
        self.fields.bundle_jre.as_ref()
    }

    pub fn set_bundle_jre(&mut self, runtime: RuntimeSpec) {
        self.fields.bundle_jre = Some(runtime);
    }

    /// Target directory of an embedded runtime, `"jre"` by default.
    pub fn bundle_jre_target(&self) -> &str {
        self.fields.bundle_jre_target.as_deref().unwrap_or("jre")
    }

    /// Sets the runtime target; all surrounding separators are stripped.
    pub fn set_bundle_jre_target(&mut self, target: &str) {
        self.fields.bundle_jre_target = Some(normalize_runtime_target(target));
    }

    pub fn main_class(&self) -> Option<&str> {
        self.fields.main_class.as_deref()
    }

    pub fn set_main_class(&mut self, main_class: impl Into<String>) {
        self.fields.main_class = Some(main_class.into());
    }

    pub fn main_jar(&self) -> Option<&str> {
        self.fields.main_jar.as_deref()
    }

    pub fn set_main_jar(&mut self, main_jar: impl Into<String>) {
        self.fields.main_jar = Some(main_jar.into());
    }

    /// Global description, never absent.
    pub fn description(&self) -> &str {
        self.fields.description.as_deref().unwrap_or("")
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.fields.description = Some(description.into());
    }

    /// Copyright notice, `"© Copyright <year> by <vendor>"` if not set.
    pub fn copyright(&self) -> String {
        match &self.fields.copyright {
            Some(copyright) => copyright.clone(),
            None => format!(
                "© Copyright {} by {}",
                chrono::Local::now().year(),
                self.vendor()
            ),
        }
    }

    pub fn set_copyright(&mut self, copyright: impl Into<String>) {
        self.fields.copyright = Some(copyright.into());
    }
}

/// Strips all leading and trailing path separators of a runtime target
/// directory.
///
/// `"/jre/"`, `"//jre//"` and `"jre"` all become `"jre"`; applying it twice
/// changes nothing.
pub fn normalize_runtime_target(target: &str) -> String {
    target.trim_matches('/').to_string()
}
