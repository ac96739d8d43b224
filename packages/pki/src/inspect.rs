//! End-to-end inspection of a CA certificate
//!
//! Decodes a PEM certificate, loads it into a single-certificate trust
//! store, examines its signature against the low-S threshold and verifies
//! it against that store.

use chrono::{DateTime, Utc};
use p256::elliptic_curve::bigint::{ArrayEncoding, U256};

use crate::authority::CertificateAuthorityBuilder;
use crate::config::CaConfig;
use crate::error::PkiResult;
use crate::low_s::{check_certificate_signature, CurveOrder, LowSCheck};
use crate::pem::decode_certificate;
use crate::trust_store::TrustStore;
use crate::verify::{verify, VerifyOptions};

/// What the inspection observed
#[derive(Debug, Clone)]
pub struct InspectionReport {
    /// Serial number, colon separated hex
    pub serial_number: String,
    /// Subject distinguished name
    pub subject: String,
    /// Start of the validity window
    pub not_before: DateTime<Utc>,
    /// End of the validity window
    pub not_after: DateTime<Utc>,
    /// BasicConstraints cA flag
    pub is_ca: bool,
    /// The certificate as decoded, re-armoured
    pub certificate_pem: String,
    /// Half-order threshold of the key's curve, big-endian hex
    pub half_order: String,
    /// Whether `half_order + 1` counts as low-S; always false
    pub threshold_probe_is_low_s: bool,
    /// Embedded and canonical signatures
    pub low_s: LowSCheck,
    /// Length of the shortest verified chain
    pub chain_length: usize,
}

impl InspectionReport {
    /// The embedded signature is already canonical
    #[must_use]
    pub fn signature_is_low_s(&self) -> bool {
        self.low_s.is_low_s()
    }
}

/// Decode, pool, check and verify a PEM CA certificate
///
/// # Errors
///
/// Returns the decoding errors of [`decode_certificate`], the errors of
/// [`check_certificate_signature`] and the errors of [`verify`].
pub fn inspect_authority_pem(pem: &str, options: &VerifyOptions) -> PkiResult<InspectionReport> {
    let certificate = decode_certificate(pem)?;

    let mut pool = TrustStore::new();
    pool.add_certificate(certificate.clone());

    let curve = CurveOrder::for_public_key(certificate.public_key_info())?;
    let probe = curve.half_order().wrapping_add(&U256::ONE);
    let threshold_probe_is_low_s = curve.is_low_s(&probe);

    let low_s = check_certificate_signature(&certificate)?;

    let chains = verify(&certificate, &pool, None, options)?;
    let chain_length = chains.iter().map(Vec::len).min().unwrap_or_default();

    tracing::info!(
        "Inspected {}: low_s={} chains={}",
        certificate.serial_number(),
        low_s.is_low_s(),
        chains.len()
    );

    Ok(InspectionReport {
        serial_number: certificate.serial_number(),
        subject: certificate.subject().to_string(),
        not_before: certificate.not_before_utc(),
        not_after: certificate.not_after_utc(),
        is_ca: certificate.is_ca(),
        certificate_pem: certificate.to_pem(),
        half_order: hex::encode(curve.half_order().to_be_byte_array()),
        threshold_probe_is_low_s,
        low_s,
        chain_length,
    })
}

/// Generate a CA from `config` and inspect it
///
/// # Errors
///
/// Returns generation errors or the errors of [`inspect_authority_pem`].
pub fn generate_and_inspect(config: &CaConfig) -> PkiResult<InspectionReport> {
    let authority = CertificateAuthorityBuilder::from_config(config.clone()).generate()?;
    inspect_authority_pem(&authority.certificate_pem(), &VerifyOptions::default())
}
