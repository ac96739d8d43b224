//! Parsed X.509 certificate model
//!
//! `ParsedCertificate` keeps the exact DER it was decoded from next to the
//! structured form, so round trips and signature checks work on the bytes
//! that were actually signed.

pub mod extensions;
pub(crate) mod name;

use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, SECP_256_R_1};
use const_oid::ObjectIdentifier;
use der::{Decode, Encode};
use p256::pkcs8::DecodePublicKey;
use spki::SubjectPublicKeyInfoOwned;
use x509_cert::ext::pkix::KeyUsage;
use x509_cert::name::Name;
use x509_cert::Certificate;

use crate::error::{PkiError, PkiResult};
use extensions::{DecodedExtensions, KeyPurpose};

/// A decoded certificate together with its raw DER encoding
#[derive(Debug, Clone)]
pub struct ParsedCertificate {
    raw: Vec<u8>,
    inner: Certificate,
    subject_der: Vec<u8>,
    issuer_der: Vec<u8>,
    extensions: DecodedExtensions,
}

impl ParsedCertificate {
    /// Decode a DER certificate
    ///
    /// # Errors
    ///
    /// Returns `PkiError::CertificateParsing` if the bytes are not a DER
    /// X.509 certificate or one of the understood extensions is malformed.
    pub fn from_der(der: &[u8]) -> PkiResult<Self> {
        let inner = Certificate::from_der(der)
            .map_err(|e| PkiError::CertificateParsing(format!("X.509 parsing failed: {e}")))?;

        let subject_der = inner
            .tbs_certificate
            .subject
            .to_der()
            .map_err(|e| PkiError::CertificateParsing(format!("Failed to encode subject: {e}")))?;
        let issuer_der = inner
            .tbs_certificate
            .issuer
            .to_der()
            .map_err(|e| PkiError::CertificateParsing(format!("Failed to encode issuer: {e}")))?;
        let extensions = DecodedExtensions::decode(inner.tbs_certificate.extensions.as_deref())?;

        Ok(Self {
            raw: der.to_vec(),
            inner,
            subject_der,
            issuer_der,
            extensions,
        })
    }

    /// Raw DER bytes exactly as decoded
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The structured `x509-cert` representation
    #[must_use]
    pub fn certificate(&self) -> &Certificate {
        &self.inner
    }

    /// Serial number as colon separated hex
    #[must_use]
    pub fn serial_number(&self) -> String {
        self.serial_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Serial number content octets (two's complement, big endian)
    #[must_use]
    pub fn serial_bytes(&self) -> &[u8] {
        self.inner.tbs_certificate.serial_number.as_bytes()
    }

    /// Subject name
    #[must_use]
    pub fn subject(&self) -> &Name {
        &self.inner.tbs_certificate.subject
    }

    /// Issuer name
    #[must_use]
    pub fn issuer(&self) -> &Name {
        &self.inner.tbs_certificate.issuer
    }

    /// DER encoding of the subject name, used for issuer lookup
    #[must_use]
    pub fn subject_der(&self) -> &[u8] {
        &self.subject_der
    }

    /// DER encoding of the issuer name
    #[must_use]
    pub fn issuer_der(&self) -> &[u8] {
        &self.issuer_der
    }

    /// True when subject and issuer are the same name
    #[must_use]
    pub fn is_self_issued(&self) -> bool {
        self.subject_der == self.issuer_der
    }

    /// Start of the validity window
    #[must_use]
    pub fn not_before(&self) -> SystemTime {
        self.inner.tbs_certificate.validity.not_before.to_system_time()
    }

    /// End of the validity window
    #[must_use]
    pub fn not_after(&self) -> SystemTime {
        self.inner.tbs_certificate.validity.not_after.to_system_time()
    }

    /// `not_after - not_before`, zero for an inverted window
    #[must_use]
    pub fn validity_period(&self) -> Duration {
        self.not_after()
            .duration_since(self.not_before())
            .unwrap_or_default()
    }

    /// Whether `time` falls inside the validity window (inclusive)
    #[must_use]
    pub fn is_valid_at(&self, time: SystemTime) -> bool {
        time >= self.not_before() && time <= self.not_after()
    }

    /// `not_before` as a UTC timestamp
    #[must_use]
    pub fn not_before_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.not_before())
    }

    /// `not_after` as a UTC timestamp
    #[must_use]
    pub fn not_after_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.not_after())
    }

    /// BasicConstraints cA flag
    #[must_use]
    pub fn is_ca(&self) -> bool {
        self.extensions
            .basic_constraints
            .as_ref()
            .is_some_and(|bc| bc.ca)
    }

    /// BasicConstraints path length, if constrained
    #[must_use]
    pub fn path_len_constraint(&self) -> Option<u8> {
        self.extensions
            .basic_constraints
            .as_ref()
            .and_then(|bc| bc.path_len_constraint)
    }

    /// KeyUsage extension, if present
    #[must_use]
    pub fn key_usage(&self) -> Option<&KeyUsage> {
        self.extensions.key_usage.as_ref()
    }

    /// Extended key usages, empty when the extension is absent
    #[must_use]
    pub fn extended_key_usage(&self) -> &[KeyPurpose] {
        &self.extensions.extended_key_usage
    }

    /// SubjectKeyIdentifier value, if present
    #[must_use]
    pub fn subject_key_id(&self) -> Option<&[u8]> {
        self.extensions.subject_key_id.as_deref()
    }

    /// OIDs of critical extensions this crate does not process
    #[must_use]
    pub fn unhandled_critical_extensions(&self) -> &[ObjectIdentifier] {
        &self.extensions.unhandled_critical
    }

    /// Subject public key info
    #[must_use]
    pub fn public_key_info(&self) -> &SubjectPublicKeyInfoOwned {
        &self.inner.tbs_certificate.subject_public_key_info
    }

    /// Subject public key as a P-256 point
    ///
    /// # Errors
    ///
    /// Returns `PkiError::UnsupportedKey` for anything but an EC key on P-256.
    pub fn public_key(&self) -> PkiResult<p256::PublicKey> {
        let spki = self.public_key_info();
        let curve = named_curve(spki)?;
        if curve != SECP_256_R_1 {
            return Err(PkiError::UnsupportedKey(format!("unsupported curve {curve}")));
        }
        let der = spki
            .to_der()
            .map_err(|e| PkiError::UnsupportedKey(format!("Failed to encode public key: {e}")))?;
        p256::PublicKey::from_public_key_der(&der)
            .map_err(|e| PkiError::UnsupportedKey(format!("invalid P-256 public key: {e}")))
    }

    /// Signature algorithm of the outer certificate
    #[must_use]
    pub fn signature_algorithm(&self) -> ObjectIdentifier {
        self.inner.signature_algorithm.oid
    }

    /// Raw signature bytes (DER `ECDSA-Sig-Value` for ECDSA certificates)
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        self.inner.signature.raw_bytes()
    }

    /// DER encoding of the to-be-signed portion
    ///
    /// # Errors
    ///
    /// Returns `PkiError::CertificateParsing` if re-encoding fails.
    pub fn tbs_der(&self) -> PkiResult<Vec<u8>> {
        self.inner
            .tbs_certificate
            .to_der()
            .map_err(|e| PkiError::CertificateParsing(format!("Failed to encode TBS: {e}")))
    }

    /// PEM encoding of the raw bytes
    #[must_use]
    pub fn to_pem(&self) -> String {
        crate::pem::encode_certificate(&self.raw)
    }
}

impl PartialEq for ParsedCertificate {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for ParsedCertificate {}

/// Named curve OID of an EC subject public key
///
/// # Errors
///
/// Returns `PkiError::UnsupportedKey` if the key is not id-ecPublicKey or
/// does not carry namedCurve parameters.
pub fn named_curve(spki: &SubjectPublicKeyInfoOwned) -> PkiResult<ObjectIdentifier> {
    if spki.algorithm.oid != ID_EC_PUBLIC_KEY {
        return Err(PkiError::UnsupportedKey(format!(
            "key algorithm {} is not id-ecPublicKey",
            spki.algorithm.oid
        )));
    }
    let params = spki
        .algorithm
        .parameters
        .as_ref()
        .ok_or_else(|| PkiError::UnsupportedKey("missing EC curve parameters".to_string()))?;
    params
        .decode_as::<ObjectIdentifier>()
        .map_err(|e| PkiError::UnsupportedKey(format!("EC parameters are not a named curve: {e}")))
}
