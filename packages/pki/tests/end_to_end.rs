//! Generate, encode, parse, pool and verify in one pass

#![allow(clippy::unwrap_used, clippy::expect_used)]

use lowsig_common::LoggingTransformer;
use lowsig_pki::{
    decode_certificate, generate_and_inspect, inspect_authority_pem, signature_s, verify,
    CaConfig, CertificateAuthorityBuilder, CurveOrder, TrustStore, VerifyOptions,
};

#[test]
fn test_generated_authority_verifies_against_pool_of_itself() {
    LoggingTransformer::init_test();

    let authority = CertificateAuthorityBuilder::new()
        .generate()
        .expect("Failed to generate CA");
    let pem = authority.certificate_pem();

    let cert = decode_certificate(&pem).expect("Failed to decode PEM");
    assert_eq!(&cert, authority.certificate());

    let mut roots = TrustStore::new();
    assert_eq!(roots.append_certs_from_pem(&pem).unwrap(), 1);
    assert!(roots.contains(&cert));

    let chains = verify(&cert, &roots, None, &VerifyOptions::default()).expect("verification");
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0], vec![cert]);
}

#[test]
fn test_inspection_of_generated_authority() {
    LoggingTransformer::init_test();

    let authority = CertificateAuthorityBuilder::new().generate().unwrap();
    let report = inspect_authority_pem(&authority.certificate_pem(), &VerifyOptions::default())
        .expect("inspection succeeds");
    let cert = authority.certificate();

    assert_eq!(report.serial_number, cert.serial_number());
    assert_eq!(report.subject, cert.subject().to_string());
    assert_eq!(report.not_before, cert.not_before_utc());
    assert_eq!(report.not_after, cert.not_after_utc());
    assert!(report.is_ca);
    assert_eq!(report.chain_length, 1);
    assert!(!report.threshold_probe_is_low_s);
    assert_eq!(report.certificate_pem, authority.certificate_pem());

    let curve = CurveOrder::p256();
    assert_eq!(report.low_s.current_signature, cert.signature());
    assert!(curve.is_low_s(&signature_s(&report.low_s.expected_signature).unwrap()));
    let embedded_is_low = curve.is_low_s(&signature_s(cert.signature()).unwrap());
    assert_eq!(report.signature_is_low_s(), embedded_is_low);
}

#[test]
fn test_generate_and_inspect_with_config() {
    let config = CaConfig::from_json_str(
        r#"{"common_name": "ca", "organization": ["Kung Fu Software"], "country": ["ES"]}"#,
    )
    .unwrap();

    let report = generate_and_inspect(&config).expect("pipeline succeeds");
    assert!(report.subject.contains("Kung Fu Software"));
    assert_eq!(report.chain_length, 1);
    assert_eq!(
        report.not_after - report.not_before,
        chrono::Duration::days(3650)
    );
}
