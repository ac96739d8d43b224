//! Self-signed ECDSA P-256 certificate authorities and low-S signatures
//!
//! - [`authority`]: generate a CA key pair and self-signed certificate
//! - [`pem`]: `CERTIFICATE` block encoding and decoding
//! - [`trust_store`] / [`verify`]: chain building against trusted roots
//! - [`low_s`]: half-order threshold and signature canonicalisation
//! - [`inspect`]: the whole pipeline in one call

pub mod authority;
pub mod certificate;
pub mod config;
pub mod error;
pub mod inspect;
pub mod low_s;
pub mod pem;
pub mod trust_store;
pub mod verify;

pub use authority::{compute_subject_key_id, CertificateAuthorityBuilder, GeneratedAuthority};
pub use certificate::extensions::{key_usage_names, KeyPurpose};
pub use certificate::ParsedCertificate;
pub use config::CaConfig;
pub use error::{PkiError, PkiResult};
pub use inspect::{generate_and_inspect, inspect_authority_pem, InspectionReport};
pub use low_s::{
    check_certificate_signature, is_low_s, signature_s, signature_to_low_s, CurveOrder, LowSCheck,
};
pub use crate::pem::{decode_all_certificates, decode_certificate, encode_certificate};
pub use trust_store::TrustStore;
pub use verify::{verify, Chain, VerifyOptions};
