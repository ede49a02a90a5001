//! Per-application launch settings.

use super::SetupConfiguration;

/// An application to wrap into a native bundle.
///
/// Values left unset fall back to the global [`SetupConfiguration`].
///
/// ```toml
/// [[application]]
/// display_name = "Report Designer"
/// main_class = "com.example.Designer"
/// main_jar = "designer.jar"
/// java_vm_arguments = ["-Xmx1g"]
/// start_arguments = "--open-last"
/// schemes = ["designer"]
///
/// [[application.document_types]]
/// file_extension = ["rpt", "rptx"]
/// name = "Report"
/// role = "editor"
/// ```
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Application {
    /// Name shown to the user; defaults to the setup application name.
    pub display_name: Option<String>,

    /// Fully qualified main class; defaults to the setup main class.
    pub main_class: Option<String>,

    /// Jar containing the main class; defaults to the setup main jar.
    pub main_jar: Option<String>,

    /// Working directory relative to `Contents/Java`.
    pub work_dir: Option<String>,

    /// Name of the launcher executable; defaults to the display name.
    pub executable: Option<String>,

    /// Options passed to the VM, one entry per option.
    pub java_vm_arguments: Vec<String>,

    /// Space separated program arguments.
    pub start_arguments: String,

    /// File types the application opens.
    pub document_types: Vec<DocumentType>,

    /// Custom URL schemes that launch the application.
    pub schemes: Vec<String>,

    /// Launched through Java Web Start; main class and jar are not required.
    pub webstart: bool,

    /// Overrides the setup description.
    pub description: Option<String>,
}

impl Application {
    /// Creates an application with only a display name set.
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            ..Default::default()
        }
    }

    pub fn display_name<'a>(&'a self, setup: &'a SetupConfiguration) -> &'a str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| setup.application())
    }

    pub fn main_class<'a>(&'a self, setup: &'a SetupConfiguration) -> Option<&'a str> {
        self.main_class.as_deref().or_else(|| setup.main_class())
    }

    pub fn main_jar<'a>(&'a self, setup: &'a SetupConfiguration) -> Option<&'a str> {
        self.main_jar.as_deref().or_else(|| setup.main_jar())
    }

    pub fn executable<'a>(&'a self, setup: &'a SetupConfiguration) -> &'a str {
        self.executable
            .as_deref()
            .unwrap_or_else(|| self.display_name(setup))
    }

    pub fn description<'a>(&'a self, setup: &'a SetupConfiguration) -> &'a str {
        self.description
            .as_deref()
            .unwrap_or_else(|| setup.description())
    }

    /// Start arguments split on whitespace, empty tokens dropped.
    pub fn start_argument_list(&self) -> Vec<String> {
        self.start_arguments
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// How an application handles a document type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRole {
    #[default]
    Viewer,
    Editor,
}

impl DocumentRole {
    /// Value used for `CFBundleTypeRole`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentRole::Viewer => "Viewer",
            DocumentRole::Editor => "Editor",
        }
    }
}

/// A document type association.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct DocumentType {
    /// File extensions without leading dot.
    #[serde(default)]
    pub file_extension: Vec<String>,
    /// Display name of the document kind.
    pub name: String,
    #[serde(default)]
    pub role: DocumentRole,
}
