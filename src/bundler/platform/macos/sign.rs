//! Code signing of assembled bundles.
//!
//! The pipeline only depends on the [`CodeSigner`] seam; [`DeveloperIdSigner`]
//! adapts [`CodeSignSettings`] to the `kodegen_bundler_sign` crate.

use crate::bundler::{
    error::{Error, Result},
    settings::CodeSignSettings,
};
use std::future::Future;
use std::path::Path;

/// Signs a bundle in place.
pub trait CodeSigner {
    fn sign(&self, bundle: &Path, settings: &CodeSignSettings) -> impl Future<Output = Result<()>>;
}

impl<S: CodeSigner + ?Sized> CodeSigner for &S {
    fn sign(&self, bundle: &Path, settings: &CodeSignSettings) -> impl Future<Output = Result<()>> {
        (**self).sign(bundle, settings)
    }
}

/// Signs with a Developer ID identity from the keychain.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeveloperIdSigner;

impl CodeSigner for DeveloperIdSigner {
    async fn sign(&self, bundle: &Path, settings: &CodeSignSettings) -> Result<()> {
        log::info!(
            "Signing {} with identity '{}'",
            bundle.display(),
            settings.identity
        );

        #[cfg(target_os = "macos")]
        {
            kodegen_bundler_sign::macos::sign_with_entitlements(
                bundle,
                &settings.identity,
                settings.entitlements.as_deref(),
                settings.hardened_runtime,
            )
            .await
            .map_err(|e| Error::Sign(format!("{}: {}", bundle.display(), e)))?;

            log::info!("✓ Successfully signed {}", bundle.display());
            Ok(())
        }

        #[cfg(not(target_os = "macos"))]
        {
            Err(Error::Sign(format!(
                "{}: code signing requires macOS",
                bundle.display()
            )))
        }
    }
}
