//! CA configuration
//!
//! Defaults reproduce the fixed subject and validity of the demonstration
//! CA: `O=Kyma, CN=kyma`, ten years, backdated five minutes.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PkiError, PkiResult};

/// Default validity window in days
pub const DEFAULT_VALIDITY_DAYS: u32 = 3650;
/// Default clock-skew allowance applied to `not_before`
pub const DEFAULT_BACKDATE_MINUTES: u32 = 5;

/// Subject and validity parameters for the generated CA
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaConfig {
    /// Subject CN, required
    pub common_name: String,
    /// Subject O values
    pub organization: Vec<String>,
    /// Subject OU values
    pub organizational_unit: Vec<String>,
    /// Subject C values, two-letter codes
    pub country: Vec<String>,
    /// Subject L values
    pub locality: Vec<String>,
    /// Subject STREET values
    pub street_address: Vec<String>,
    /// Length of the validity window in days
    pub validity_days: u32,
    /// Minutes `not_before` is moved back from the rounded current time
    pub backdate_minutes: u32,
}

impl Default for CaConfig {
    fn default() -> Self {
        Self {
            common_name: "kyma".to_string(),
            organization: vec!["Kyma".to_string()],
            organizational_unit: Vec::new(),
            country: Vec::new(),
            locality: Vec::new(),
            street_address: Vec::new(),
            validity_days: DEFAULT_VALIDITY_DAYS,
            backdate_minutes: DEFAULT_BACKDATE_MINUTES,
        }
    }
}

impl CaConfig {
    /// Parse and validate a JSON document; absent fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns `PkiError::Serialization` for malformed JSON and
    /// `PkiError::Configuration` when validation fails.
    pub fn from_json_str(json: &str) -> PkiResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns `PkiError::Io` if the file cannot be read, otherwise the
    /// errors of [`CaConfig::from_json_str`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> PkiResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded CA config from {}", path.as_ref().display());
        Self::from_json_str(&contents)
    }

    /// Check the values the certificate factory relies on
    ///
    /// # Errors
    ///
    /// Returns `PkiError::Configuration` describing the first violation.
    pub fn validate(&self) -> PkiResult<()> {
        if self.common_name.trim().is_empty() {
            return Err(PkiError::Configuration(
                "common_name must not be empty".to_string(),
            ));
        }
        if self.validity_days == 0 {
            return Err(PkiError::Configuration(
                "validity_days must be greater than zero".to_string(),
            ));
        }
        if let Some(code) = self
            .country
            .iter()
            .find(|c| c.len() != 2 || !c.chars().all(|ch| ch.is_ascii_alphabetic()))
        {
            return Err(PkiError::Configuration(format!(
                "country must be a two-letter code, got {code:?}"
            )));
        }
        Ok(())
    }

    /// Validity window length
    #[must_use]
    pub fn validity(&self) -> Duration {
        Duration::from_secs(u64::from(self.validity_days) * 24 * 60 * 60)
    }

    /// Amount `not_before` is moved into the past
    #[must_use]
    pub fn backdate(&self) -> Duration {
        Duration::from_secs(u64::from(self.backdate_minutes) * 60)
    }
}
