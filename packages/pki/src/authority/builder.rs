//! Fluent builder for the self-signed CA

use std::time::{Duration, SystemTime};

use super::GeneratedAuthority;
use crate::config::CaConfig;
use crate::error::PkiResult;

/// Builder for a self-signed ECDSA P-256 certificate authority
///
/// Starts from [`CaConfig::default`]; every setter replaces the
/// corresponding attribute.
///
/// ```rust,no_run
/// # use lowsig_pki::CertificateAuthorityBuilder;
/// # fn example() -> lowsig_pki::PkiResult<()> {
/// let authority = CertificateAuthorityBuilder::new()
///     .common_name("ca")
///     .organization("Kung Fu Software")
///     .country("ES")
///     .valid_for_days(3650)
///     .generate()?;
/// println!("{}", authority.certificate_pem());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CertificateAuthorityBuilder {
    config: CaConfig,
}

impl CertificateAuthorityBuilder {
    /// Builder with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded configuration
    #[must_use]
    pub fn from_config(config: CaConfig) -> Self {
        Self { config }
    }

    /// Subject common name
    #[must_use]
    pub fn common_name(mut self, common_name: &str) -> Self {
        self.config.common_name = common_name.to_string();
        self
    }

    /// Subject organization
    #[must_use]
    pub fn organization(mut self, organization: &str) -> Self {
        self.config.organization = vec![organization.to_string()];
        self
    }

    /// Subject organizational unit
    #[must_use]
    pub fn organizational_unit(mut self, unit: &str) -> Self {
        self.config.organizational_unit = vec![unit.to_string()];
        self
    }

    /// Subject country (two-letter code)
    #[must_use]
    pub fn country(mut self, country: &str) -> Self {
        self.config.country = vec![country.to_string()];
        self
    }

    /// Subject locality
    #[must_use]
    pub fn locality(mut self, locality: &str) -> Self {
        self.config.locality = vec![locality.to_string()];
        self
    }

    /// Subject street address
    #[must_use]
    pub fn street_address(mut self, street: &str) -> Self {
        self.config.street_address = vec![street.to_string()];
        self
    }

    /// Validity period in days
    #[must_use]
    pub fn valid_for_days(mut self, days: u32) -> Self {
        self.config.validity_days = days;
        self
    }

    /// Clock-skew allowance subtracted from `not_before`, whole minutes
    #[must_use]
    pub fn backdate(mut self, backdate: Duration) -> Self {
        self.config.backdate_minutes = u32::try_from(backdate.as_secs() / 60).unwrap_or(u32::MAX);
        self
    }

    /// Configuration the builder will generate from
    #[must_use]
    pub fn config(&self) -> &CaConfig {
        &self.config
    }

    /// Generate the key pair and certificate now
    ///
    /// # Errors
    ///
    /// Returns `PkiError::Configuration` for invalid settings,
    /// `PkiError::Randomness` / `PkiError::KeyGeneration` when key material
    /// cannot be produced and `PkiError::CertificateConstruction` when
    /// encoding or signing fails.
    pub fn generate(self) -> PkiResult<GeneratedAuthority> {
        self.generate_at(SystemTime::now())
    }

    /// Generate as if the current time were `now`
    ///
    /// # Errors
    ///
    /// Same as [`CertificateAuthorityBuilder::generate`].
    pub fn generate_at(self, now: SystemTime) -> PkiResult<GeneratedAuthority> {
        self.config.validate()?;
        let authority = super::generation::generate_self_signed(&self.config, now)?;
        tracing::info!(
            "Generated CA certificate with serial {}",
            authority.certificate().serial_number()
        );
        Ok(authority)
    }
}
