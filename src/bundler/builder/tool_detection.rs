//! External tool detection and availability checking.
//!
//! The pipeline only needs these tools for particular features, so missing
//! ones are reported once as warnings instead of failing up front.

use crate::bundler::platform::macos::{plist::PLIST_BUDDY, runtime::JAVA_HOME};
use std::sync::LazyLock;

/// Whether PlistBuddy is available for patching preference pane manifests.
///
/// Cached result to avoid repeated lookups during bundling.
pub static HAS_PLIST_BUDDY: LazyLock<bool> = LazyLock::new(|| detect("PlistBuddy", PLIST_BUDDY));

/// Whether `java_home` is available for resolving runtime versions.
pub static HAS_JAVA_HOME: LazyLock<bool> = LazyLock::new(|| detect("java_home", JAVA_HOME));

fn detect(name: &str, program: &str) -> bool {
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", name, path.display());
            true
        }
        Err(e) => {
            log::debug!("{} not found at {}: {}", name, program, e);
            false
        }
    }
}
