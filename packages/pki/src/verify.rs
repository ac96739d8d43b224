//! Certificate chain verification
//!
//! Builds chains from a leaf to an anchor in the root store. Every link is
//! checked for validity at the requested time, CA status of the issuer,
//! key usage, extended key usage and an ecdsa-with-SHA256 signature over
//! the child's TBS bytes.

use std::time::SystemTime;

use const_oid::db::rfc5912::ECDSA_WITH_SHA_256;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use x509_cert::ext::pkix::KeyUsages;

use crate::certificate::extensions::KeyPurpose;
use crate::certificate::ParsedCertificate;
use crate::error::{PkiError, PkiResult};
use crate::trust_store::TrustStore;

/// Default bound on the number of certificates in a chain
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 8;

/// A verified chain, leaf first, trust anchor last
pub type Chain = Vec<ParsedCertificate>;

/// Parameters for [`verify`]
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Instant at which validity windows are checked
    pub current_time: SystemTime,
    /// Acceptable extended key usages; `KeyPurpose::Any` accepts everything
    pub key_usages: Vec<KeyPurpose>,
    /// Maximum number of certificates in a chain, anchor included
    pub max_chain_depth: usize,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            current_time: SystemTime::now(),
            key_usages: vec![KeyPurpose::ServerAuth],
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }
}

impl VerifyOptions {
    /// Check validity at `time` instead of now
    #[must_use]
    pub fn at(mut self, time: SystemTime) -> Self {
        self.current_time = time;
        self
    }

    /// Replace the acceptable extended key usages
    #[must_use]
    pub fn with_key_usages(mut self, key_usages: Vec<KeyPurpose>) -> Self {
        self.key_usages = key_usages;
        self
    }
}

/// Verify `certificate` against `roots`, optionally through `intermediates`
///
/// Returns every chain that could be built. A certificate that is itself in
/// `roots` yields a single chain of length one.
///
/// # Errors
///
/// - `PkiError::CertificateExpired` if the leaf or every candidate issuer
///   is outside its validity window
/// - `PkiError::IncompatibleUsage` if extended key usages do not match
/// - `PkiError::UnhandledCriticalExtension` if a certificate carries a
///   critical extension that is not understood
/// - `PkiError::NotAuthority` if the only candidate issuers are not CAs
/// - `PkiError::PathLengthExceeded` if an issuer's pathLenConstraint is
///   violated
/// - `PkiError::SignatureMismatch` if no issuer key verifies the signature
/// - `PkiError::UnknownAuthority` if no issuer is found at all
pub fn verify(
    certificate: &ParsedCertificate,
    roots: &TrustStore,
    intermediates: Option<&TrustStore>,
    options: &VerifyOptions,
) -> PkiResult<Vec<Chain>> {
    check_validity(certificate, options.current_time)?;
    check_critical_extensions(certificate)?;
    check_extended_key_usage(certificate, &options.key_usages)?;

    if roots.contains(certificate) {
        tracing::debug!(
            "Certificate {} is a trust anchor",
            certificate.serial_number()
        );
        return Ok(vec![vec![certificate.clone()]]);
    }

    let mut builder = ChainBuilder {
        roots,
        intermediates,
        options,
        chains: Vec::new(),
        last_error: None,
    };
    let mut chain = vec![certificate.clone()];
    builder.extend(&mut chain);

    if builder.chains.is_empty() {
        let err = builder.last_error.unwrap_or_else(|| {
            PkiError::UnknownAuthority(format!(
                "no issuer found for {}",
                certificate.issuer()
            ))
        });
        tracing::debug!("Verification of {} failed: {err}", certificate.serial_number());
        return Err(err);
    }

    tracing::debug!(
        "Verified {} with {} chain(s)",
        certificate.serial_number(),
        builder.chains.len()
    );
    Ok(builder.chains)
}

struct ChainBuilder<'a> {
    roots: &'a TrustStore,
    intermediates: Option<&'a TrustStore>,
    options: &'a VerifyOptions,
    chains: Vec<Chain>,
    last_error: Option<PkiError>,
}

impl ChainBuilder<'_> {
    fn extend(&mut self, chain: &mut Chain) {
        if chain.len() >= self.options.max_chain_depth {
            self.record(PkiError::UnknownAuthority(format!(
                "chain exceeds maximum depth of {}",
                self.options.max_chain_depth
            )));
            return;
        }
        let Some(child) = chain.last().cloned() else {
            return;
        };

        let anchors: Vec<ParsedCertificate> =
            self.roots.find_by_subject(child.issuer_der()).cloned().collect();
        for anchor in anchors {
            if chain.contains(&anchor) {
                continue;
            }
            match self.check_issuer(chain, &anchor) {
                Ok(()) => {
                    let mut complete = chain.clone();
                    complete.push(anchor);
                    self.chains.push(complete);
                }
                Err(e) => self.record(e),
            }
        }

        let Some(intermediates) = self.intermediates else {
            return;
        };
        let candidates: Vec<ParsedCertificate> = intermediates
            .find_by_subject(child.issuer_der())
            .filter(|candidate| !self.roots.contains(candidate))
            .cloned()
            .collect();
        for candidate in candidates {
            if chain.contains(&candidate) {
                continue;
            }
            match self.check_issuer(chain, &candidate) {
                Ok(()) => {
                    chain.push(candidate);
                    self.extend(chain);
                    chain.pop();
                }
                Err(e) => self.record(e),
            }
        }
    }

    /// Whether `issuer` may sign the last certificate of `chain`
    fn check_issuer(&self, chain: &[ParsedCertificate], issuer: &ParsedCertificate) -> PkiResult<()> {
        let Some(child) = chain.last() else {
            return Err(PkiError::UnknownAuthority("empty chain".to_string()));
        };
        check_validity(issuer, self.options.current_time)?;
        check_critical_extensions(issuer)?;
        if !issuer.is_ca() {
            return Err(PkiError::NotAuthority(issuer.subject().to_string()));
        }
        check_path_length(chain, issuer)?;
        if let Some(key_usage) = issuer.key_usage() {
            if !key_usage.0.contains(KeyUsages::KeyCertSign) {
                return Err(PkiError::NotAuthority(format!(
                    "{} lacks keyCertSign",
                    issuer.subject()
                )));
            }
        }
        check_extended_key_usage(issuer, &self.options.key_usages)?;
        check_signature(child, issuer)
    }

    fn record(&mut self, err: PkiError) {
        self.last_error = Some(err);
    }
}

fn check_validity(certificate: &ParsedCertificate, time: SystemTime) -> PkiResult<()> {
    if certificate.is_valid_at(time) {
        return Ok(());
    }
    Err(PkiError::CertificateExpired(format!(
        "{} is valid from {} to {}",
        certificate.subject(),
        certificate.not_before_utc().to_rfc3339(),
        certificate.not_after_utc().to_rfc3339()
    )))
}

fn check_critical_extensions(certificate: &ParsedCertificate) -> PkiResult<()> {
    match certificate.unhandled_critical_extensions() {
        [] => Ok(()),
        oids => Err(PkiError::UnhandledCriticalExtension(format!(
            "{} carries {}",
            certificate.subject(),
            oids.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// pathLenConstraint counts the non-self-issued CA certificates between
/// the issuer and the leaf
fn check_path_length(chain: &[ParsedCertificate], issuer: &ParsedCertificate) -> PkiResult<()> {
    let Some(max) = issuer.path_len_constraint() else {
        return Ok(());
    };
    let below = chain
        .iter()
        .skip(1)
        .filter(|cert| !cert.is_self_issued())
        .count();
    if below > usize::from(max) {
        return Err(PkiError::PathLengthExceeded(format!(
            "{} allows {max} intermediate(s), found {below}",
            issuer.subject()
        )));
    }
    Ok(())
}

fn check_extended_key_usage(certificate: &ParsedCertificate, wanted: &[KeyPurpose]) -> PkiResult<()> {
    let present = certificate.extended_key_usage();
    if present.is_empty() || wanted.contains(&KeyPurpose::Any) {
        return Ok(());
    }
    if present
        .iter()
        .any(|purpose| *purpose == KeyPurpose::Any || wanted.contains(purpose))
    {
        return Ok(());
    }
    Err(PkiError::IncompatibleUsage(format!(
        "{} allows {:?}, wanted {:?}",
        certificate.subject(),
        present,
        wanted
    )))
}

/// Check `child`'s signature with `issuer`'s public key
fn check_signature(child: &ParsedCertificate, issuer: &ParsedCertificate) -> PkiResult<()> {
    let algorithm = child.signature_algorithm();
    if algorithm != ECDSA_WITH_SHA_256 {
        return Err(PkiError::UnsupportedAlgorithm(algorithm.to_string()));
    }

    let verifying_key = VerifyingKey::from(&issuer.public_key()?);
    let signature = Signature::from_der(child.signature())
        .map_err(|e| PkiError::InvalidSignature(format!("Failed to parse ECDSA signature: {e}")))?;
    let tbs = child.tbs_der()?;

    verifying_key.verify(&tbs, &signature).map_err(|_| {
        PkiError::SignatureMismatch(format!(
            "{} was not signed by {}",
            child.subject(),
            issuer.subject()
        ))
    })
}
