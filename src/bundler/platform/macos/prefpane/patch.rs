//! Manifest patches applied to a relocated preference pane.

use crate::bundler::platform::macos::plist::{PlistOp, PlistPatch, PlistType};
use crate::bundler::settings::{PreferencesLink, SUPERUSER};
use std::path::PathBuf;

/// Values written into the pane's launchd service descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub label: String,
    pub description: String,
    pub version: String,
    pub keep_alive: bool,
    pub run_at_boot: bool,
    pub daemon_user: String,
}

/// Patch for the pane's own `Info.plist`.
pub fn info_plist_patch(
    file: impl Into<PathBuf>,
    identifier: &str,
    display_name: &str,
    internal_name: &str,
) -> PlistPatch {
    let mut patch = PlistPatch::new(file);
    patch
        .set(":CFBundleIdentifier", format!("{identifier}.prefPane"))
        .set(":CFBundleName", format!("{display_name} Preference Pane"))
        .set(":CFBundleExecutable", internal_name)
        .set(":NSPrefPaneIconLabel", display_name)
        .add(
            ":NSPrefPaneHelperApplication",
            PlistType::String,
            format!("{display_name} Helper"),
        )
        .add(
            ":NSAppleEventsUsageDescription",
            PlistType::String,
            format!("Helper application to provide priviledged access to {display_name}"),
        );
    patch
}

/// Patch for the embedded `service.plist`, including the rebuilt
/// `starter` array.
pub fn service_plist_patch(
    file: impl Into<PathBuf>,
    service: &ServiceDescriptor,
    links: &[PreferencesLink],
) -> PlistPatch {
    let mut patch = PlistPatch::new(file);
    patch
        .set(":Name", &service.name)
        .set(":Label", &service.label)
        .set(":Description", &service.description)
        .set(":Version", &service.version)
        .set(":KeepAlive", service.keep_alive.to_string())
        .set(":RunAtBoot", service.run_at_boot.to_string())
        .set(":RunAtLoad", "true");

    if service.daemon_user != SUPERUSER {
        patch
            .add(":UserName", PlistType::String, &service.daemon_user)
            .add(":GroupName", PlistType::String, &service.daemon_user);
    }

    patch.extend(starter_ops(links, &service.daemon_user));
    patch
}

/// Deletes the `starter` array and rebuilds it from `links`.
///
/// The array itself is created together with the first entry; every entry
/// is appended as an empty dict and then filled at its index, so the
/// operations must be applied exactly in this order.
pub fn starter_ops(links: &[PreferencesLink], daemon_user: &str) -> Vec<PlistOp> {
    let add = |key: String, kind: PlistType, value: Option<String>| PlistOp::Add { key, kind, value };

    let mut ops = vec![PlistOp::Delete {
        key: ":starter".into(),
    }];

    for (i, link) in links.iter().enumerate() {
        if i == 0 {
            ops.push(add(":starter".into(), PlistType::Array, None));
        }
        ops.push(add(":starter:".into(), PlistType::Dict, None));
        ops.push(add(
            format!(":starter:{i}:title"),
            PlistType::String,
            Some(link.title.clone()),
        ));
        ops.push(add(
            format!(":starter:{i}:action"),
            PlistType::String,
            Some(link.action.clone()),
        ));
        ops.push(add(
            format!(":starter:{i}:asuser"),
            PlistType::String,
            Some(daemon_user.to_string()),
        ));
        ops.push(add(
            format!(":starter:{i}:asroot"),
            PlistType::Bool,
            Some(if link.run_as_root { "YES" } else { "NO" }.to_string()),
        ));
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(user: &str) -> ServiceDescriptor {
        ServiceDescriptor {
            name: "Report Server".into(),
            label: "com.example.reportserver".into(),
            description: "Serves reports".into(),
            version: "2.0.1".into(),
            keep_alive: true,
            run_at_boot: false,
            daemon_user: user.into(),
        }
    }

    #[test]
    fn info_plist_identity_keys() {
        let patch = info_plist_patch("Info.plist", "com.example.server", "Report Server", "ReportServer");
        let commands: Vec<_> = patch.ops().iter().map(PlistOp::command).collect();
        assert_eq!(
            commands,
            [
                "Set :CFBundleIdentifier com.example.server.prefPane",
                "Set :CFBundleName Report Server Preference Pane",
                "Set :CFBundleExecutable ReportServer",
                "Set :NSPrefPaneIconLabel Report Server",
                "Add :NSPrefPaneHelperApplication string Report Server Helper",
                "Add :NSAppleEventsUsageDescription string Helper application to provide \
                 priviledged access to Report Server",
            ]
        );
    }

    #[test]
    fn starter_array_is_rebuilt_in_link_order() {
        let links = [
            PreferencesLink::new("Open Console", "http://localhost:9000", false),
            PreferencesLink::new("Restart", "restart", true),
            PreferencesLink::new("Logs", "open-logs", false),
        ];
        let ops = starter_ops(&links, "_reports");

        // one delete, one array creation, then a dict plus four keys per link
        assert_eq!(ops.len(), 1 + 1 + links.len() * 5);
        assert_eq!(ops[0].command(), "Delete :starter");
        assert_eq!(ops[1].command(), "Add :starter array");
        assert_eq!(ops[2].command(), "Add :starter: dict");
        assert_eq!(ops[3].command(), "Add :starter:0:title string Open Console");
        assert_eq!(ops[6].command(), "Add :starter:0:asroot bool NO");
        assert_eq!(ops[7].command(), "Add :starter: dict");
        assert_eq!(ops[11].command(), "Add :starter:1:asroot bool YES");
        assert_eq!(ops[15].command(), "Add :starter:2:asuser string _reports");

        let deletes = ops.iter().filter(|op| matches!(op, PlistOp::Delete { .. })).count();
        assert_eq!(deletes, 1);
    }

    #[test]
    fn no_links_only_delete_the_array() {
        let ops = starter_ops(&[], SUPERUSER);
        assert_eq!(ops.len(), 1);
    }

    #[test]
    fn daemon_user_keys_only_for_non_superuser() {
        let root = service_plist_patch("service.plist", &descriptor(SUPERUSER), &[]);
        assert!(!root.ops().iter().any(|op| op.key() == ":UserName"));

        let user = service_plist_patch("service.plist", &descriptor("_reports"), &[]);
        let commands: Vec<_> = user.ops().iter().map(PlistOp::command).collect();
        assert!(commands.contains(&"Add :UserName string _reports".to_string()));
        assert!(commands.contains(&"Add :GroupName string _reports".to_string()));
        assert_eq!(commands[4], "Set :KeepAlive true");
        assert_eq!(commands[5], "Set :RunAtBoot false");
        assert_eq!(commands[6], "Set :RunAtLoad true");
    }
}
