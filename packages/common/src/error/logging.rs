//! Structured logging infrastructure
//!
//! Provides env_logger-based logging with redaction of key material
//! and integration with the standard log crate. Library crates emit
//! through `tracing` with its `log` feature, so everything lands here.

use log::{debug, error, info, warn};
use sha2::{Digest, Sha256};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Logging entry points shared by the lowsig binaries and tests
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging (call once at application startup)
    ///
    /// Levels come from `RUST_LOG`, defaulting to `info`:
    /// - `RUST_LOG=debug` - Enable all debug logs
    /// - `RUST_LOG=lowsig_pki=debug,lowsig_demo=info` - Module-specific levels
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .format_timestamp_micros()
                .init();

            debug!("Structured logging initialized");
        });
    }

    /// Initialize logging for test environments
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Log creation of a certificate authority
    pub fn log_authority_generated(subject: &str, serial: &str, not_after: &str) {
        info!("Generated CA certificate: subject={subject} serial={serial} not_after={not_after}");
    }

    /// Log a key identifier without printing it verbatim
    pub fn log_key_identifier(operation: &str, key_id: &[u8]) {
        let key_hash = Self::secure_hash_bytes(key_id);
        debug!("{operation}: key_id_hash={key_hash}");
    }

    /// Log the outcome of a chain verification
    pub fn log_verification(subject: &str, chain_len: usize, success: bool) {
        if success {
            info!("Verified {subject} (chain_len: {chain_len})");
        } else {
            warn!("Verification failed for {subject}");
        }
    }

    /// Log the outcome of the low-S signature comparison
    pub fn log_low_s_result(serial: &str, signature_is_low_s: bool) {
        if signature_is_low_s {
            info!("Signature of {serial} is in canonical low-S form");
        } else {
            warn!("Signature of {serial} is high-S; canonical form differs");
        }
    }

    /// Log cryptographic failures by operation and error type only
    pub fn log_crypto_error(operation: &str, error: &dyn std::error::Error) {
        error!(
            "Cryptographic operation failed: {} (error_type: {})",
            operation,
            std::any::type_name_of_val(error)
        );
    }

    /// SHA-256 based fingerprint for logging
    ///
    /// Returns `#` followed by the first 12 hex characters of the digest.
    fn secure_hash_bytes(data: &[u8]) -> String {
        let hash = hex::encode(Sha256::digest(data));
        format!("#{}", &hash[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_identifier_hash_is_stable_and_short() {
        LoggingTransformer::init_test();

        let first = LoggingTransformer::secure_hash_bytes(b"key-id-1");
        let second = LoggingTransformer::secure_hash_bytes(b"key-id-2");

        assert_ne!(first, second);
        assert_eq!(first, LoggingTransformer::secure_hash_bytes(b"key-id-1"));
        assert!(first.starts_with('#'));
        assert_eq!(first.len(), 13);
    }

    #[test]
    fn logging_helpers_do_not_panic() {
        LoggingTransformer::init_test();

        LoggingTransformer::log_authority_generated("CN=kyma,O=Kyma", "01:02", "2036-01-01");
        LoggingTransformer::log_key_identifier("ski", &[1, 2, 3]);
        LoggingTransformer::log_verification("CN=kyma,O=Kyma", 1, true);
        LoggingTransformer::log_low_s_result("01:02", false);
    }
}
