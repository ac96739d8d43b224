//! Generate a self-signed P-256 CA, round-trip it through PEM, verify it
//! against a pool holding only itself and report whether its signature is
//! already in low-S form.
//!
//! Environment:
//! - `RUST_LOG`: log filter, `info` by default
//! - `LOWSIG_CA_CONFIG`: optional path to a JSON CA configuration

use std::process::ExitCode;

use log::{debug, error, info};
use lowsig_common::{ErrorKind, LoggingTransformer, Result, ResultExt};
use lowsig_pki::{inspect_authority_pem, CaConfig, CertificateAuthorityBuilder, VerifyOptions};

const CONFIG_ENV: &str = "LOWSIG_CA_CONFIG";

fn main() -> ExitCode {
    LoggingTransformer::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.kind() == &ErrorKind::Crypto {
                LoggingTransformer::log_crypto_error("CA generation", &e);
            }
            error!("{e}");
            debug!("Error origin:\n{:?}", e.backtrace());
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<CaConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            info!("Loading CA configuration from {}", path.to_string_lossy());
            CaConfig::from_file(&path)
                .with_context(|| format!("loading CA configuration from {}", path.to_string_lossy()))
        }
        None => Ok(CaConfig::default()),
    }
}

fn run() -> Result<()> {
    let config = load_config()?;

    let authority = CertificateAuthorityBuilder::from_config(config)
        .generate()
        .context("generating certificate authority")?;
    let certificate = authority.certificate();
    lowsig_common::ensure!(certificate.is_ca(), validation, "generated certificate is not a CA");

    LoggingTransformer::log_authority_generated(
        &certificate.subject().to_string(),
        &certificate.serial_number(),
        &certificate.not_after_utc().to_rfc3339(),
    );
    if let Some(key_id) = certificate.subject_key_id() {
        LoggingTransformer::log_key_identifier("CA subject key identifier", key_id);
    }

    let pem = authority.certificate_pem();
    info!("CA certificate:\n{pem}");

    let report = inspect_authority_pem(&pem, &VerifyOptions::default())
        .context("inspecting generated certificate")?;

    info!("Half order: {}", report.half_order);
    info!(
        "half_order + 1 is low-S: {}",
        report.threshold_probe_is_low_s
    );
    info!(
        "Current signature:  {}",
        hex::encode_upper(&report.low_s.current_signature)
    );
    info!(
        "Expected signature: {}",
        hex::encode_upper(&report.low_s.expected_signature)
    );
    LoggingTransformer::log_low_s_result(&report.serial_number, report.signature_is_low_s());
    LoggingTransformer::log_verification(&report.subject, report.chain_length, true);

    Ok(())
}
