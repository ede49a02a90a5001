//! macOS application bundles and service preference panes.
//!
//! # Layout produced
//!
//! ```text
//! <Name>.app/Contents/
//!     Info.plist
//!     MacOS/<executable>
//!     Resources/<icon>.icns
//!     Resources/<Service>.prefPane/Contents/{MacOS,Resources}
//!     Java/<payload>
//!     PlugIns/<runtime target>/
//! ```
//!
//! # External tools
//!
//! | Step | Tool | Notes |
//! |------|------|-------|
//! | Runtime lookup | `/usr/libexec/java_home` | only for version specs |
//! | Permissions | `chmod`, `find` | two passes, files first |
//! | Manifest patching | `/usr/libexec/PlistBuddy` | one process per operation |
//! | Preference pane | `gradle` | nested `clean xcodebuild` |
//! | Code signing | `codesign` via `kodegen_bundler_sign` | optional |
//!
//! The [`app`] module drives bundle assembly, [`appbundler`] writes the
//! bundle tree, and [`prefpane`] builds and embeds preference panes.

pub mod app;
pub mod appbundler;
pub mod plist;
pub mod prefpane;
pub mod runtime;
pub mod sign;

pub use app::{BundleAssembler, bundle_identifier, short_version, validate_bundle_name};
pub use appbundler::{AppBundler, AppBundlerTask};
pub use plist::{PlistApplier, PlistBuddy, PlistOp, PlistPatch, PlistType};
pub use prefpane::{PaneHost, PipelineState, PrefPaneOrchestrator};
pub use sign::{CodeSigner, DeveloperIdSigner};
