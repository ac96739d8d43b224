//! X.509 extension identifiers and decoding
//!
//! Extensions are decoded once when a certificate is parsed so malformed
//! values are rejected up front, the way a strict parser would.

use const_oid::AssociatedOid;
use const_oid::ObjectIdentifier;
use der::Decode;
use x509_cert::ext::pkix::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, KeyUsages, SubjectKeyIdentifier,
};
use x509_cert::ext::Extension;

use crate::error::{PkiError, PkiResult};

pub use const_oid::db::rfc5280::{ANY_EXTENDED_KEY_USAGE, ID_KP_CLIENT_AUTH, ID_KP_SERVER_AUTH};

/// Extended key usage purposes the verifier understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPurpose {
    /// anyExtendedKeyUsage
    Any,
    /// TLS web server authentication
    ServerAuth,
    /// TLS web client authentication
    ClientAuth,
    /// Any other purpose, kept by OID
    Other(ObjectIdentifier),
}

impl KeyPurpose {
    /// Map an EKU OID to a purpose
    #[must_use]
    pub fn from_oid(oid: ObjectIdentifier) -> Self {
        match oid {
            ID_KP_SERVER_AUTH => Self::ServerAuth,
            ID_KP_CLIENT_AUTH => Self::ClientAuth,
            ANY_EXTENDED_KEY_USAGE => Self::Any,
            other => Self::Other(other),
        }
    }

    /// OID encoded in the certificate for this purpose
    #[must_use]
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            Self::Any => ANY_EXTENDED_KEY_USAGE,
            Self::ServerAuth => ID_KP_SERVER_AUTH,
            Self::ClientAuth => ID_KP_CLIENT_AUTH,
            Self::Other(oid) => *oid,
        }
    }
}

/// Extensions of a certificate that the verifier and the report consume
#[derive(Debug, Clone, Default)]
pub(crate) struct DecodedExtensions {
    pub basic_constraints: Option<BasicConstraints>,
    pub key_usage: Option<KeyUsage>,
    pub extended_key_usage: Vec<KeyPurpose>,
    pub subject_key_id: Option<Vec<u8>>,
    /// Critical extensions none of the above cover
    pub unhandled_critical: Vec<ObjectIdentifier>,
}

impl DecodedExtensions {
    pub(crate) fn decode(extensions: Option<&[Extension]>) -> PkiResult<Self> {
        let mut decoded = Self::default();

        for ext in extensions.unwrap_or_default() {
            let value = ext.extn_value.as_bytes();
            if ext.extn_id == BasicConstraints::OID {
                decoded.basic_constraints =
                    Some(BasicConstraints::from_der(value).map_err(|e| bad_extension("BasicConstraints", &e))?);
            } else if ext.extn_id == KeyUsage::OID {
                decoded.key_usage =
                    Some(KeyUsage::from_der(value).map_err(|e| bad_extension("KeyUsage", &e))?);
            } else if ext.extn_id == ExtendedKeyUsage::OID {
                let eku = ExtendedKeyUsage::from_der(value)
                    .map_err(|e| bad_extension("ExtendedKeyUsage", &e))?;
                decoded.extended_key_usage = eku.0.into_iter().map(KeyPurpose::from_oid).collect();
            } else if ext.extn_id == SubjectKeyIdentifier::OID {
                let ski = SubjectKeyIdentifier::from_der(value)
                    .map_err(|e| bad_extension("SubjectKeyIdentifier", &e))?;
                decoded.subject_key_id = Some(ski.0.as_bytes().to_vec());
            } else if ext.critical {
                tracing::debug!("Unhandled critical extension {}", ext.extn_id);
                decoded.unhandled_critical.push(ext.extn_id);
            }
        }

        Ok(decoded)
    }
}

fn bad_extension(name: &str, err: &der::Error) -> PkiError {
    PkiError::CertificateParsing(format!("malformed {name} extension: {err}"))
}

/// Human-readable names of the key usage bits that are set
#[must_use]
pub fn key_usage_names(key_usage: &KeyUsage) -> Vec<&'static str> {
    const NAMES: [(KeyUsages, &str); 9] = [
        (KeyUsages::DigitalSignature, "digitalSignature"),
        (KeyUsages::NonRepudiation, "nonRepudiation"),
        (KeyUsages::KeyEncipherment, "keyEncipherment"),
        (KeyUsages::DataEncipherment, "dataEncipherment"),
        (KeyUsages::KeyAgreement, "keyAgreement"),
        (KeyUsages::KeyCertSign, "keyCertSign"),
        (KeyUsages::CRLSign, "cRLSign"),
        (KeyUsages::EncipherOnly, "encipherOnly"),
        (KeyUsages::DecipherOnly, "decipherOnly"),
    ];

    NAMES
        .iter()
        .filter(|(flag, _)| key_usage.0.contains(*flag))
        .map(|(_, name)| *name)
        .collect()
}
