//! Distinguished name construction

use const_oid::db::rfc4519::{C, CN, L, O, OU, STREET};
use const_oid::ObjectIdentifier;
use der::asn1::SetOfVec;
use der::{Any, Tag};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};

use crate::config::CaConfig;
use crate::error::{PkiError, PkiResult};

/// Build the subject name from configuration
///
/// Attribute order follows the common convention `C, L, STREET, O, OU, CN`,
/// one attribute per RDN.
pub(crate) fn subject_from_config(config: &CaConfig) -> PkiResult<Name> {
    let mut rdns = Vec::new();

    let groups: [(ObjectIdentifier, &[String]); 5] = [
        (C, &config.country),
        (L, &config.locality),
        (STREET, &config.street_address),
        (O, &config.organization),
        (OU, &config.organizational_unit),
    ];
    for (oid, values) in groups {
        for value in values {
            rdns.push(single_attribute(oid, value)?);
        }
    }
    rdns.push(single_attribute(CN, &config.common_name)?);

    Ok(RdnSequence(rdns))
}

fn single_attribute(oid: ObjectIdentifier, value: &str) -> PkiResult<RelativeDistinguishedName> {
    let tag = if is_printable(value) {
        Tag::PrintableString
    } else {
        Tag::Utf8String
    };
    let value = Any::new(tag, value.as_bytes())
        .map_err(|e| PkiError::CertificateConstruction(format!("invalid name value: {e}")))?;

    let set = SetOfVec::try_from(vec![AttributeTypeAndValue { oid, value }])
        .map_err(|e| PkiError::CertificateConstruction(format!("invalid RDN: {e}")))?;
    Ok(RelativeDistinguishedName(set))
}

/// PrintableString character set (X.680 §41.4)
fn is_printable(value: &str) -> bool {
    value.bytes().all(|b| {
        b.is_ascii_alphanumeric()
            || matches!(
                b,
                b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?'
            )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_detection() {
        assert!(is_printable("Karl-Liebknecht-Str. 3"));
        assert!(is_printable("Kyma"));
        assert!(!is_printable("München"));
        assert!(!is_printable("a_b"));
    }

    #[test]
    fn default_subject_renders_organization_and_common_name() {
        let name = subject_from_config(&CaConfig::default())
            .unwrap_or_else(|e| panic!("subject should build: {e}"));
        assert_eq!(name.0.len(), 2);
        let rendered = name.to_string();
        assert!(rendered.contains("=kyma"));
        assert!(rendered.contains("=Kyma"));
    }
}
