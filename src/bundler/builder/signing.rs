//! Code signing setup and certificate management.
//!
//! On CI the signing identity is not in the login keychain; it is imported
//! from environment variables into a temporary keychain that lives as long
//! as the [`Bundler`](super::Bundler).

use crate::bundler::{Error, Result};

/// Base64-encoded `.p12` certificate.
pub const CERTIFICATE_VAR: &str = "APPLE_CERTIFICATE";

/// Password of [`CERTIFICATE_VAR`].
pub const CERTIFICATE_PASSWORD_VAR: &str = "APPLE_CERTIFICATE_PASSWORD";

/// A certificate to import, decoded from its environment form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateImport {
    pub bytes: Vec<u8>,
    pub password: String,
}

/// Decodes a base64 certificate and its password.
///
/// Returns `None` unless both values are present.
pub fn decode_certificate(
    certificate: Option<String>,
    password: Option<String>,
) -> Result<Option<CertificateImport>> {
    let (Some(certificate), Some(password)) = (certificate, password) else {
        return Ok(None);
    };

    use base64::Engine;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(certificate.trim())
        .map_err(|e| {
            Error::Sign(format!(
                "invalid {CERTIFICATE_VAR} (not valid base64): {e}"
            ))
        })?;

    Ok(Some(CertificateImport {
        bytes,
        password: password.trim().to_string(),
    }))
}

/// Reads the certificate from [`CERTIFICATE_VAR`] and
/// [`CERTIFICATE_PASSWORD_VAR`].
pub fn certificate_from_env() -> Result<Option<CertificateImport>> {
    decode_certificate(
        std::env::var(CERTIFICATE_VAR).ok(),
        std::env::var(CERTIFICATE_PASSWORD_VAR).ok(),
    )
}

/// Imports the environment certificate into a temporary keychain.
#[cfg(target_os = "macos")]
pub async fn setup_macos_signing() -> Result<Option<kodegen_bundler_sign::macos::TempKeychain>> {
    let Some(import) = certificate_from_env()? else {
        return Ok(None);
    };

    log::info!("Importing certificate from {} environment variable", CERTIFICATE_VAR);
    let keychain =
        kodegen_bundler_sign::macos::TempKeychain::from_certificate_bytes(&import.bytes, &import.password)
            .await
            .map_err(|e| Error::Sign(format!("failed to import certificate: {}", e)))?;

    log::info!("✓ Certificate imported to temporary keychain");
    Ok(Some(keychain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_values_are_required() {
        assert!(decode_certificate(Some("AAEC".into()), None).unwrap().is_none());
        assert!(decode_certificate(None, Some("secret".into())).unwrap().is_none());
    }

    #[test]
    fn certificate_is_decoded_and_password_trimmed() {
        let import = decode_certificate(Some("AAEC\n".into()), Some(" secret\n".into()))
            .unwrap()
            .unwrap();
        assert_eq!(import.bytes, [0, 1, 2]);
        assert_eq!(import.password, "secret");
    }

    #[test]
    fn malformed_certificate_is_a_sign_error() {
        let err = decode_certificate(Some("not base64!".into()), Some("x".into())).unwrap_err();
        assert!(matches!(err, Error::Sign(_)));
    }
}
