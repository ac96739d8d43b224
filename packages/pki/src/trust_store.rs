//! In-memory certificate pool
//!
//! Certificates are indexed by the DER encoding of their subject so the
//! verifier can find candidate issuers by exact name match.

use std::collections::HashMap;

use crate::certificate::ParsedCertificate;
use crate::error::PkiResult;
use crate::pem::certificate_blocks;

/// A set of certificates used as roots or intermediates
#[derive(Debug, Clone, Default)]
pub struct TrustStore {
    certificates: Vec<ParsedCertificate>,
    by_subject: HashMap<Vec<u8>, Vec<usize>>,
}

impl TrustStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a certificate; returns `false` if an identical one is already present
    pub fn add_certificate(&mut self, certificate: ParsedCertificate) -> bool {
        if self.contains(&certificate) {
            return false;
        }
        let index = self.certificates.len();
        self.by_subject
            .entry(certificate.subject_der().to_vec())
            .or_default()
            .push(index);
        self.certificates.push(certificate);
        true
    }

    /// Add every parseable `CERTIFICATE` block from PEM text
    ///
    /// Blocks that fail to parse are skipped with a warning. Returns the
    /// number of certificates newly added.
    ///
    /// # Errors
    ///
    /// Returns `PkiError::PemDecode` if the PEM armour itself is malformed.
    pub fn append_certs_from_pem(&mut self, pem: impl AsRef<[u8]>) -> PkiResult<usize> {
        let mut added = 0;
        for block in certificate_blocks(pem)? {
            match ParsedCertificate::from_der(block.contents()) {
                Ok(certificate) => {
                    if self.add_certificate(certificate) {
                        added += 1;
                    }
                }
                Err(e) => tracing::warn!("Skipping unparseable certificate: {e}"),
            }
        }
        Ok(added)
    }

    /// Whether a byte-identical certificate is present
    #[must_use]
    pub fn contains(&self, certificate: &ParsedCertificate) -> bool {
        self.find_by_subject(certificate.subject_der())
            .any(|candidate| candidate == certificate)
    }

    /// Number of certificates
    #[must_use]
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// True when the store holds no certificates
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Certificates whose subject DER equals `subject_der`
    pub fn find_by_subject<'a>(
        &'a self,
        subject_der: &[u8],
    ) -> impl Iterator<Item = &'a ParsedCertificate> + 'a {
        self.by_subject
            .get(subject_der)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&index| &self.certificates[index])
    }

    /// All certificates in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ParsedCertificate> {
        self.certificates.iter()
    }
}

impl FromIterator<ParsedCertificate> for TrustStore {
    fn from_iter<I: IntoIterator<Item = ParsedCertificate>>(iter: I) -> Self {
        let mut store = Self::new();
        for certificate in iter {
            store.add_certificate(certificate);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store() {
        let store = TrustStore::new();
        assert!(store.is_empty());
        assert_eq!(store.find_by_subject(b"nothing").count(), 0);
    }

    #[test]
    fn garbage_pem_is_an_error() {
        let mut store = TrustStore::new();
        let result = store.append_certs_from_pem("-----BEGIN CERTIFICATE-----\n!!!\n-----END CERTIFICATE-----\n");
        assert!(result.is_err());
    }

    #[test]
    fn unparseable_blocks_are_skipped() {
        let pem = crate::pem::encode_certificate(b"not a certificate");
        let mut store = TrustStore::new();
        let added = store
            .append_certs_from_pem(pem)
            .unwrap_or_else(|e| panic!("armour is valid: {e}"));
        assert_eq!(added, 0);
        assert!(store.is_empty());
    }
}
