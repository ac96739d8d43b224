//! Self-signed CA certificate generation
//!
//! Builds the TBS certificate field by field, signs its DER with the fresh
//! P-256 key and re-parses the result.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use const_oid::db::rfc5912::ECDSA_WITH_SHA_256;
use const_oid::AssociatedOid;
use der::asn1::{BitString, GeneralizedTime, OctetString, UtcTime};
use der::Encode;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::EncodePublicKey;
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::ext::pkix::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, KeyUsages, SubjectKeyIdentifier,
};
use x509_cert::ext::Extension;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};
use x509_cert::{Certificate, TbsCertificate, Version};
use zeroize::Zeroize;

use super::GeneratedAuthority;
use crate::certificate::extensions::{ID_KP_CLIENT_AUTH, ID_KP_SERVER_AUTH};
use crate::certificate::name::subject_from_config;
use crate::certificate::ParsedCertificate;
use crate::config::CaConfig;
use crate::error::{PkiError, PkiResult};

/// Serial numbers are drawn uniformly below 2^128
const SERIAL_NUMBER_BYTES: usize = 16;

/// Generate a key pair and a self-signed CA certificate
pub(crate) fn generate_self_signed(config: &CaConfig, now: SystemTime) -> PkiResult<GeneratedAuthority> {
    let serial_number = random_serial_number()?;
    let signing_key = generate_signing_key()?;
    let verifying_key = *signing_key.verifying_key();

    let not_before = round_to_minute(now)
        .checked_sub(config.backdate())
        .ok_or_else(|| PkiError::CertificateConstruction("not_before precedes the epoch".to_string()))?;
    let not_after = not_before
        .checked_add(config.validity())
        .ok_or_else(|| PkiError::CertificateConstruction("not_after overflows".to_string()))?;

    let subject = subject_from_config(config)?;
    let signature_algorithm = AlgorithmIdentifierOwned {
        oid: ECDSA_WITH_SHA_256,
        parameters: None,
    };

    let tbs_certificate = TbsCertificate {
        version: Version::V3,
        serial_number,
        signature: signature_algorithm.clone(),
        issuer: subject.clone(),
        validity: Validity {
            not_before: to_x509_time(not_before)?,
            not_after: to_x509_time(not_after)?,
        },
        subject,
        subject_public_key_info: subject_public_key_info(&verifying_key)?,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: Some(ca_extensions(&verifying_key)?),
    };

    let tbs_der = tbs_certificate.to_der()?;
    let signature: Signature = signing_key
        .try_sign(&tbs_der)
        .map_err(|e| PkiError::CertificateConstruction(format!("signing failed: {e}")))?;

    let certificate = Certificate {
        tbs_certificate,
        signature_algorithm,
        signature: BitString::from_bytes(signature.to_der().as_bytes())?,
    };
    let der = certificate.to_der()?;
    let certificate = ParsedCertificate::from_der(&der)?;

    tracing::debug!(
        "Self-signed CA {} with serial {}",
        certificate.subject(),
        certificate.serial_number()
    );

    Ok(GeneratedAuthority::new(certificate, signing_key))
}

/// SubjectKeyIdentifier per RFC 7093 §2 method 4: SHA-256 of the
/// uncompressed SEC1 point
#[must_use]
pub fn compute_subject_key_id(public_key: &VerifyingKey) -> Vec<u8> {
    let point = public_key.to_encoded_point(false);
    Sha256::digest(point.as_bytes()).to_vec()
}

fn ca_extensions(public_key: &VerifyingKey) -> PkiResult<Vec<Extension>> {
    let key_usage = KeyUsage(
        KeyUsages::DigitalSignature
            | KeyUsages::KeyEncipherment
            | KeyUsages::KeyCertSign
            | KeyUsages::CRLSign,
    );
    let extended_key_usage = ExtendedKeyUsage(vec![ID_KP_CLIENT_AUTH, ID_KP_SERVER_AUTH]);
    let basic_constraints = BasicConstraints {
        ca: true,
        path_len_constraint: None,
    };
    let subject_key_id = SubjectKeyIdentifier(OctetString::new(compute_subject_key_id(public_key))?);

    Ok(vec![
        extension(KeyUsage::OID, true, &key_usage)?,
        extension(ExtendedKeyUsage::OID, false, &extended_key_usage)?,
        extension(BasicConstraints::OID, true, &basic_constraints)?,
        extension(SubjectKeyIdentifier::OID, false, &subject_key_id)?,
    ])
}

fn extension<T: Encode>(
    extn_id: const_oid::ObjectIdentifier,
    critical: bool,
    value: &T,
) -> PkiResult<Extension> {
    Ok(Extension {
        extn_id,
        critical,
        extn_value: OctetString::new(value.to_der()?)?,
    })
}

fn subject_public_key_info(public_key: &VerifyingKey) -> PkiResult<SubjectPublicKeyInfoOwned> {
    let document = public_key
        .to_public_key_der()
        .map_err(|e| PkiError::CertificateConstruction(format!("Failed to encode public key: {e}")))?;
    Ok(der::Decode::from_der(document.as_bytes())?)
}

fn random_serial_number() -> PkiResult<SerialNumber> {
    let mut bytes = [0u8; SERIAL_NUMBER_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| PkiError::Randomness(format!("Failed to generate serial number: {e}")))?;
    SerialNumber::new(&positive_integer_bytes(&bytes))
        .map_err(|e| PkiError::CertificateConstruction(format!("invalid serial number: {e}")))
}

fn generate_signing_key() -> PkiResult<SigningKey> {
    let mut secret = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut secret)
        .map_err(|e| PkiError::Randomness(format!("Failed to generate private key: {e}")))?;
    let key = SigningKey::from_slice(&secret)
        .map_err(|e| PkiError::KeyGeneration(format!("Failed to create signing key: {e}")));
    secret.zeroize();
    key
}

/// Minimal two's complement encoding of an unsigned big-endian integer
fn positive_integer_bytes(unsigned: &[u8]) -> Vec<u8> {
    let start = unsigned
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(unsigned.len());
    let mut out = Vec::with_capacity(unsigned.len() + 1);
    match unsigned.get(start) {
        None => out.push(0x01),
        Some(&high) => {
            if high & 0x80 != 0 {
                out.push(0x00);
            }
            out.extend_from_slice(&unsigned[start..]);
        }
    }
    out
}

/// Round to the nearest whole minute, halves rounding up
fn round_to_minute(time: SystemTime) -> SystemTime {
    let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();
    let minutes = (since_epoch.as_millis() + 30_000) / 60_000;
    let secs = u64::try_from(minutes * 60).unwrap_or(u64::MAX);
    UNIX_EPOCH + Duration::from_secs(secs)
}

/// UTCTime through 2049, GeneralizedTime afterwards (RFC 5280 §4.1.2.5)
fn to_x509_time(time: SystemTime) -> PkiResult<Time> {
    match UtcTime::from_system_time(time) {
        Ok(utc) => Ok(Time::UtcTime(utc)),
        Err(_) => Ok(Time::GeneralTime(GeneralizedTime::from_system_time(time)?)),
    }
}
