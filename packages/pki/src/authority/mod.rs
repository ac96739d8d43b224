//! Certificate authority generation
//!
//! - `builder`: fluent entry point and configuration plumbing
//! - `generation`: key, serial, extensions and self-signing

pub mod builder;
pub mod generation;

use std::fmt;

use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::pkcs8::{EncodePrivateKey, LineEnding};
use zeroize::Zeroizing;

use crate::certificate::ParsedCertificate;
use crate::error::{PkiError, PkiResult};

pub use builder::CertificateAuthorityBuilder;
pub use generation::compute_subject_key_id;

/// A freshly generated CA certificate and the key that signed it
pub struct GeneratedAuthority {
    certificate: ParsedCertificate,
    signing_key: SigningKey,
}

impl GeneratedAuthority {
    pub(crate) fn new(certificate: ParsedCertificate, signing_key: SigningKey) -> Self {
        Self {
            certificate,
            signing_key,
        }
    }

    /// The self-signed certificate
    #[must_use]
    pub fn certificate(&self) -> &ParsedCertificate {
        &self.certificate
    }

    /// The CA private key
    #[must_use]
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// The CA public key
    #[must_use]
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Certificate as a PEM `CERTIFICATE` block
    #[must_use]
    pub fn certificate_pem(&self) -> String {
        self.certificate.to_pem()
    }

    /// Private key as PKCS#8 PEM, zeroized on drop
    ///
    /// # Errors
    ///
    /// Returns `PkiError::KeyGeneration` if PKCS#8 encoding fails.
    pub fn private_key_pem(&self) -> PkiResult<Zeroizing<String>> {
        self.signing_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| PkiError::KeyGeneration(format!("Failed to encode private key: {e}")))
    }

    /// Split into certificate and key
    #[must_use]
    pub fn into_parts(self) -> (ParsedCertificate, SigningKey) {
        (self.certificate, self.signing_key)
    }
}

impl fmt::Debug for GeneratedAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedAuthority")
            .field("serial_number", &self.certificate.serial_number())
            .field("subject", &self.certificate.subject().to_string())
            .field("signing_key", &"<redacted>")
            .finish()
    }
}
