//! PEM armour for certificates (RFC 7468)

use ::pem::{EncodeConfig, LineEnding, Pem};

use crate::certificate::ParsedCertificate;
use crate::error::{PkiError, PkiResult};

/// Label of certificate blocks
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Wrap DER certificate bytes in a `CERTIFICATE` block (64 columns, LF)
#[must_use]
pub fn encode_certificate(der: &[u8]) -> String {
    let block = Pem::new(CERTIFICATE_LABEL, der.to_vec());
    ::pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
}

/// Decode the first PEM block and parse it as a certificate
///
/// # Errors
///
/// - `PkiError::PemDecode` when no well-formed block is found
/// - `PkiError::UnexpectedPemLabel` when the block is not a certificate
/// - `PkiError::CertificateParsing` when the contents are not valid DER
pub fn decode_certificate(input: impl AsRef<[u8]>) -> PkiResult<ParsedCertificate> {
    let block = ::pem::parse(input).map_err(|e| PkiError::PemDecode(e.to_string()))?;
    if block.tag() != CERTIFICATE_LABEL {
        return Err(PkiError::UnexpectedPemLabel(block.tag().to_string()));
    }
    ParsedCertificate::from_der(block.contents())
}

/// Decode every `CERTIFICATE` block, ignoring blocks with other labels
///
/// # Errors
///
/// Returns `PkiError::PemDecode` if the armour is malformed and
/// `PkiError::CertificateParsing` if any certificate block fails to parse.
pub fn decode_all_certificates(input: impl AsRef<[u8]>) -> PkiResult<Vec<ParsedCertificate>> {
    certificate_blocks(input)?
        .iter()
        .map(|block| ParsedCertificate::from_der(block.contents()))
        .collect()
}

/// All blocks labelled `CERTIFICATE`
pub(crate) fn certificate_blocks(input: impl AsRef<[u8]>) -> PkiResult<Vec<Pem>> {
    let blocks = ::pem::parse_many(input).map_err(|e| PkiError::PemDecode(e.to_string()))?;
    Ok(blocks
        .into_iter()
        .filter(|block| {
            let keep = block.tag() == CERTIFICATE_LABEL;
            if !keep {
                tracing::debug!("Skipping PEM block labelled {}", block.tag());
            }
            keep
        })
        .collect())
}
