//! Platform-specific bundling implementations.
//!
//! Only macOS targets are assembled. The modules build and test on every
//! host; the tools they drive (`PlistBuddy`, `java_home`, `codesign`) exist
//! on macOS only.

pub mod macos;
