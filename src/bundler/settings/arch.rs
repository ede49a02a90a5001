//! CPU architectures of a macOS application bundle.

use std::fmt;

/// CPU architecture a bundle launcher is preferred to run as.
///
/// Listed in `LSArchitecturePriority`, first entry preferred.
///
/// ```toml
/// [dmg]
/// architecture = ["arm64", "x86_64"]
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// Apple Silicon
    #[serde(alias = "aarch64")]
    Arm64,
    /// 64-bit Intel
    #[serde(alias = "x86-64", alias = "amd64")]
    X86_64,
    /// 32-bit Intel
    I386,
    /// PowerPC (legacy bundles)
    Ppc,
}

impl Arch {
    /// Name used in `LSArchitecturePriority`.
    pub fn plist_name(&self) -> &'static str {
        match self {
            Arch::Arm64 => "arm64",
            Arch::X86_64 => "x86_64",
            Arch::I386 => "i386",
            Arch::Ppc => "ppc",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plist_name())
    }
}
