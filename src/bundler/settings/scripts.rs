//! Install and uninstall hook scripts.
//!
//! Fragments are only accumulated here; packaging backends turn them into
//! their platform's script files.

use std::fmt;

/// The four lifecycle hook points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptHook {
    PreInstall,
    PostInstall,
    PreRemove,
    PostRemove,
}

impl ScriptHook {
    /// All hooks in install-to-remove order.
    pub const ALL: [ScriptHook; 4] = [
        ScriptHook::PreInstall,
        ScriptHook::PostInstall,
        ScriptHook::PreRemove,
        ScriptHook::PostRemove,
    ];

    /// Conventional script file name of the hook.
    pub fn file_name(&self) -> &'static str {
        match self {
            ScriptHook::PreInstall => "preinst",
            ScriptHook::PostInstall => "postinst",
            ScriptHook::PreRemove => "prerm",
            ScriptHook::PostRemove => "postrm",
        }
    }
}

impl fmt::Display for ScriptHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Ordered, append-only script fragments for each hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleScripts {
    preinst: Vec<String>,
    postinst: Vec<String>,
    prerm: Vec<String>,
    postrm: Vec<String>,
}

impl LifecycleScripts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment to `hook`; earlier fragments are kept.
    pub fn append(&mut self, hook: ScriptHook, content: impl Into<String>) {
        self.slot_mut(hook).push(content.into());
    }

    /// Fragments of `hook` in the order they were appended.
    pub fn get(&self, hook: ScriptHook) -> &[String] {
        match hook {
            ScriptHook::PreInstall => &self.preinst,
            ScriptHook::PostInstall => &self.postinst,
            ScriptHook::PreRemove => &self.prerm,
            ScriptHook::PostRemove => &self.postrm,
        }
    }

    pub fn is_empty(&self) -> bool {
        ScriptHook::ALL.iter().all(|hook| self.get(*hook).is_empty())
    }

    fn slot_mut(&mut self, hook: ScriptHook) -> &mut Vec<String> {
        match hook {
            ScriptHook::PreInstall => &mut self.preinst,
            ScriptHook::PostInstall => &mut self.postinst,
            ScriptHook::PreRemove => &mut self.prerm,
            ScriptHook::PostRemove => &mut self.postrm,
        }
    }
}

/// Deserializes `[scripts]` by appending each listed fragment in order.
impl<'de> serde::Deserialize<'de> for LifecycleScripts {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Default, serde::Deserialize)]
        #[serde(default)]
        struct Raw {
            preinst: Vec<String>,
            postinst: Vec<String>,
            prerm: Vec<String>,
            postrm: Vec<String>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let mut scripts = LifecycleScripts::new();
        for (hook, fragments) in [
            (ScriptHook::PreInstall, raw.preinst),
            (ScriptHook::PostInstall, raw.postinst),
            (ScriptHook::PreRemove, raw.prerm),
            (ScriptHook::PostRemove, raw.postrm),
        ] {
            for fragment in fragments {
                scripts.append(hook, fragment);
            }
        }
        Ok(scripts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_keep_call_order_per_hook() {
        let mut scripts = LifecycleScripts::new();
        scripts.append(ScriptHook::PostInstall, "echo one");
        scripts.append(ScriptHook::PostInstall, "echo two");
        scripts.append(ScriptHook::PostInstall, "echo three");

        assert_eq!(
            scripts.get(ScriptHook::PostInstall),
            ["echo one", "echo two", "echo three"]
        );
        for hook in [ScriptHook::PreInstall, ScriptHook::PreRemove, ScriptHook::PostRemove] {
            assert!(scripts.get(hook).is_empty(), "{hook} should be empty");
        }
        assert!(!scripts.is_empty());
    }

    #[test]
    fn deserializes_lists_in_order() {
        let scripts: LifecycleScripts = toml::from_str(
            r#"
            prerm = ["launchctl unload /Library/LaunchDaemons/x.plist"]
            postinst = ["a", "b"]
            "#,
        )
        .unwrap();

        assert_eq!(scripts.get(ScriptHook::PostInstall), ["a", "b"]);
        assert_eq!(scripts.get(ScriptHook::PreRemove).len(), 1);
        assert!(scripts.get(ScriptHook::PreInstall).is_empty());
    }
}
