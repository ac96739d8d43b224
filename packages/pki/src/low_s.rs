//! Low-S signature canonicalisation
//!
//! An ECDSA signature `(r, s)` has a twin `(r, n - s)` that verifies just as
//! well. Constraining `s` to the lower half of the scalar range leaves one
//! acceptable encoding per signature.

use const_oid::db::rfc5912::SECP_256_R_1;
use p256::ecdsa::Signature;
use p256::elliptic_curve::bigint::{ArrayEncoding, U256};
use p256::elliptic_curve::Curve;
use p256::NistP256;
use spki::SubjectPublicKeyInfoOwned;

use crate::certificate::{named_curve, ParsedCertificate};
use crate::error::{PkiError, PkiResult};

/// Group order of a curve and the derived low-S threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveOrder {
    name: &'static str,
    order: U256,
    half_order: U256,
}

impl CurveOrder {
    /// NIST P-256 / secp256r1
    #[must_use]
    pub fn p256() -> Self {
        let order = NistP256::ORDER;
        Self {
            name: "P-256",
            order,
            half_order: order.shr_vartime(1),
        }
    }

    /// Resolve the curve of an EC subject public key
    ///
    /// # Errors
    ///
    /// Returns `PkiError::UnsupportedKey` for non-EC keys and curves other
    /// than P-256.
    pub fn for_public_key(spki: &SubjectPublicKeyInfoOwned) -> PkiResult<Self> {
        match named_curve(spki)? {
            SECP_256_R_1 => Ok(Self::p256()),
            other => Err(PkiError::UnsupportedKey(format!(
                "no curve order known for {other}"
            ))),
        }
    }

    /// Curve name
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Group order `n`
    #[must_use]
    pub fn order(&self) -> &U256 {
        &self.order
    }

    /// `n >> 1`, the largest low-S value
    #[must_use]
    pub fn half_order(&self) -> &U256 {
        &self.half_order
    }

    /// `s <= n >> 1`
    #[must_use]
    pub fn is_low_s(&self, s: &U256) -> bool {
        s <= &self.half_order
    }

    /// Canonical low-S form of `s`
    ///
    /// Returns `None` when `s` is not a valid signature scalar, i.e. zero or
    /// not below the group order.
    #[must_use]
    pub fn to_low_s(&self, s: &U256) -> Option<U256> {
        if *s == U256::ZERO || *s >= self.order {
            return None;
        }
        if self.is_low_s(s) {
            Some(*s)
        } else {
            Some(self.order.wrapping_sub(s))
        }
    }
}

/// Whether `s` is low-S for the curve of `public_key`
///
/// # Errors
///
/// Returns `PkiError::UnsupportedKey` if the key's curve is not supported.
pub fn is_low_s(public_key: &SubjectPublicKeyInfoOwned, s: &U256) -> PkiResult<bool> {
    Ok(CurveOrder::for_public_key(public_key)?.is_low_s(s))
}

/// The S component of a DER `ECDSA-Sig-Value`
///
/// # Errors
///
/// Returns `PkiError::InvalidSignature` for malformed or out-of-range
/// signatures.
pub fn signature_s(der_signature: &[u8]) -> PkiResult<U256> {
    let signature = parse_signature(der_signature)?;
    let (_, s) = signature.split_bytes();
    Ok(U256::from_be_byte_array(s))
}

/// Canonical low-S DER encoding of a signature
///
/// Low-S input is returned unchanged; otherwise S is replaced by `n - S`
/// and the signature re-encoded.
///
/// # Errors
///
/// Returns `PkiError::UnsupportedKey` for unsupported keys and
/// `PkiError::InvalidSignature` for malformed signatures.
pub fn signature_to_low_s(
    public_key: &SubjectPublicKeyInfoOwned,
    der_signature: &[u8],
) -> PkiResult<Vec<u8>> {
    let curve = CurveOrder::for_public_key(public_key)?;
    let signature = parse_signature(der_signature)?;
    let (r, s) = signature.split_bytes();
    let s = U256::from_be_byte_array(s);

    if curve.is_low_s(&s) {
        return Ok(der_signature.to_vec());
    }

    let low_s = curve
        .to_low_s(&s)
        .ok_or_else(|| PkiError::InvalidSignature("S is out of range".to_string()))?;
    let canonical = Signature::from_scalars(r, low_s.to_be_byte_array())
        .map_err(|e| PkiError::InvalidSignature(format!("Failed to rebuild signature: {e}")))?;
    Ok(canonical.to_der().as_bytes().to_vec())
}

fn parse_signature(der_signature: &[u8]) -> PkiResult<Signature> {
    Signature::from_der(der_signature)
        .map_err(|e| PkiError::InvalidSignature(format!("Failed to parse ECDSA signature: {e}")))
}

/// Embedded signature of a certificate next to its canonical low-S form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowSCheck {
    /// Curve the signature was checked against
    pub curve: CurveOrder,
    /// Signature as embedded in the certificate
    pub current_signature: Vec<u8>,
    /// Canonical low-S encoding
    pub expected_signature: Vec<u8>,
}

impl LowSCheck {
    /// The embedded signature already is the canonical one
    #[must_use]
    pub fn is_low_s(&self) -> bool {
        self.current_signature == self.expected_signature
    }
}

/// Compare a certificate's signature with its canonical low-S form
///
/// The key is the certificate's own public key, which is the signer for a
/// self-signed certificate.
///
/// # Errors
///
/// Returns the errors of [`signature_to_low_s`].
pub fn check_certificate_signature(certificate: &ParsedCertificate) -> PkiResult<LowSCheck> {
    let public_key = certificate.public_key_info();
    let curve = CurveOrder::for_public_key(public_key)?;
    let current_signature = certificate.signature().to_vec();
    let expected_signature = signature_to_low_s(public_key, &current_signature)?;

    let check = LowSCheck {
        curve,
        current_signature,
        expected_signature,
    };
    tracing::debug!(
        "Signature of {} is_low_s={}",
        certificate.serial_number(),
        check.is_low_s()
    );
    Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p256_half_order_constant() {
        let curve = CurveOrder::p256();
        assert_eq!(
            *curve.half_order(),
            U256::from_be_hex("7fffffff800000007fffffffffffffffde737d56d38bcf4279dce5617e3192a8")
        );
        assert!(curve.is_low_s(curve.half_order()));
        assert!(!curve.is_low_s(&curve.half_order().wrapping_add(&U256::ONE)));
    }

    #[test]
    fn boundary_values_canonicalise_into_lower_half() {
        let curve = CurveOrder::p256();
        let just_high = curve.half_order().wrapping_add(&U256::ONE);
        assert_eq!(curve.to_low_s(&just_high), Some(*curve.half_order()));

        let max = curve.order().wrapping_sub(&U256::ONE);
        assert_eq!(curve.to_low_s(&max), Some(U256::ONE));
        assert_eq!(curve.to_low_s(&U256::ONE), Some(U256::ONE));
    }

    #[test]
    fn out_of_range_scalars_have_no_low_form() {
        let curve = CurveOrder::p256();
        assert_eq!(curve.to_low_s(&U256::ZERO), None);
        assert_eq!(curve.to_low_s(curve.order()), None);
        assert_eq!(curve.to_low_s(&curve.order().wrapping_add(&U256::ONE)), None);
        assert_eq!(curve.to_low_s(&U256::MAX), None);
    }
}
