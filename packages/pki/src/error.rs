//! PKI error taxonomy
//!
//! Every failure the certificate pipeline can hit is a distinct variant so
//! callers decide which ones are fatal.

use lowsig_common::{Error, ErrorKind};

/// Errors produced by CA generation, PEM handling, verification and low-S checks
#[derive(Debug, thiserror::Error)]
pub enum PkiError {
    /// OS randomness unavailable
    #[error("Randomness source failed: {0}")]
    Randomness(String),
    /// Key material rejected or not encodable
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),
    /// Building, encoding or signing the certificate failed
    #[error("Certificate construction failed: {0}")]
    CertificateConstruction(String),
    /// No decodable PEM block
    #[error("PEM decoding failed: {0}")]
    PemDecode(String),
    /// PEM block with a label other than `CERTIFICATE`
    #[error("Unexpected PEM block label: {0}")]
    UnexpectedPemLabel(String),
    /// Contents are not a DER X.509 certificate
    #[error("Certificate parsing failed: {0}")]
    CertificateParsing(String),
    /// Key is not EC on P-256
    #[error("Unsupported public key: {0}")]
    UnsupportedKey(String),
    /// Signature algorithm other than ecdsa-with-SHA256
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// Malformed `ECDSA-Sig-Value`
    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),
    /// Issuer key does not verify the signature
    #[error("Signature verification failed: {0}")]
    SignatureMismatch(String),
    /// Outside the validity window
    #[error("Certificate expired or not yet valid: {0}")]
    CertificateExpired(String),
    /// Issuer lacks the CA flag or keyCertSign
    #[error("Issuer is not a certificate authority: {0}")]
    NotAuthority(String),
    /// Extended key usage does not allow the requested purpose
    #[error("Certificate not valid for the requested usage: {0}")]
    IncompatibleUsage(String),
    /// Critical extension that is not processed
    #[error("Unhandled critical extension: {0}")]
    UnhandledCriticalExtension(String),
    /// Too many intermediates below a constrained CA
    #[error("Path length constraint exceeded: {0}")]
    PathLengthExceeded(String),
    /// No chain to a trusted root
    #[error("Certificate signed by unknown authority: {0}")]
    UnknownAuthority(String),
    /// Invalid `CaConfig`
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PkiError {
    /// Coarse category used when the error crosses into `lowsig_common::Error`
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Randomness(_) | Self::KeyGeneration(_) | Self::CertificateConstruction(_) => {
                ErrorKind::Crypto
            }
            Self::PemDecode(_)
            | Self::UnexpectedPemLabel(_)
            | Self::CertificateParsing(_)
            | Self::InvalidSignature(_)
            | Self::Serialization(_) => ErrorKind::Encoding,
            Self::UnsupportedKey(_)
            | Self::UnsupportedAlgorithm(_)
            | Self::SignatureMismatch(_)
            | Self::CertificateExpired(_)
            | Self::NotAuthority(_)
            | Self::IncompatibleUsage(_)
            | Self::UnhandledCriticalExtension(_)
            | Self::PathLengthExceeded(_)
            | Self::UnknownAuthority(_) => ErrorKind::Validation,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<PkiError> for Error {
    fn from(err: PkiError) -> Self {
        let kind = err.kind();
        Error::with_source(kind, err)
    }
}

impl From<der::Error> for PkiError {
    fn from(err: der::Error) -> Self {
        Self::CertificateConstruction(format!("DER encoding failed: {err}"))
    }
}

/// Result alias for PKI operations
pub type PkiResult<T> = Result<T, PkiError>;
