//! Background services and their preference pane links.

use super::{Application, SetupConfiguration};

/// The superuser account services run as unless configured otherwise.
pub const SUPERUSER: &str = "root";

/// A background service installed together with a preference pane.
///
/// A service is an application as well: it gets its own bundle, and the
/// preference pane is embedded into that bundle's resources.
///
/// ```toml
/// [[service]]
/// display_name = "Report Server"
/// id = "com.example.reportserver"
/// keep_alive = true
/// start_on_boot = true
/// daemon_user = "_reports"
/// main_class = "com.example.Server"
/// ```
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Service {
    /// Launch settings of the service application.
    #[serde(flatten)]
    pub application: Application,

    /// Launchd label; defaults to the setup application identifier.
    pub id: Option<String>,

    /// Restart the service whenever it exits.
    pub keep_alive: bool,

    /// Start the service when the system boots.
    pub start_on_boot: bool,

    /// Account the daemon runs as; the superuser by default.
    pub daemon_user: Option<String>,
}

impl Service {
    pub fn display_name<'a>(&'a self, setup: &'a SetupConfiguration) -> &'a str {
        self.application.display_name(setup)
    }

    pub fn id<'a>(&'a self, setup: &'a SetupConfiguration) -> &'a str {
        self.id.as_deref().unwrap_or_else(|| setup.app_identifier())
    }

    pub fn description<'a>(&'a self, setup: &'a SetupConfiguration) -> &'a str {
        self.application.description(setup)
    }

    pub fn daemon_user(&self) -> &str {
        self.daemon_user.as_deref().unwrap_or(SUPERUSER)
    }
}

/// A named action exposed by the preference pane.
///
/// Links are kept in configuration order; the index of a link is its
/// position in the pane's `starter` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct PreferencesLink {
    pub title: String,
    pub action: String,
    #[serde(default)]
    pub run_as_root: bool,
}

impl PreferencesLink {
    pub fn new(title: impl Into<String>, action: impl Into<String>, run_as_root: bool) -> Self {
        Self {
            title: title.into(),
            action: action.into(),
            run_as_root,
        }
    }
}
