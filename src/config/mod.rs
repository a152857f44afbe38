// Configuration module for FlightSurety
// Protocol constants and behaviour flags, layered from file and environment

pub mod presets;
pub mod validation;

pub use presets::{ProtocolProfile, HARDENED_REQUEST_TTL};
pub use validation::{ConfigValidationError, ConfigValidator, ValidationResult, ValidationRule};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ConfigError;
use crate::ledger::{Amount, UNIT};

/// Environment variable prefix, e.g. `FLIGHTSURETY__ORACLE__MIN_RESPONSES=2`
pub const ENV_PREFIX: &str = "FLIGHTSURETY";

/// What happens to value paid above the airline registration fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeePolicy {
    /// The whole payment is kept and counted as contribution
    AcceptExcess,
    /// Exactly the fee is kept, the remainder goes back to the payer
    RefundExcess,
    /// Anything but the exact fee is rejected
    RequireExact,
}

impl Default for FeePolicy {
    fn default() -> Self {
        FeePolicy::AcceptExcess
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Airlines join without a vote while fewer than this many are registered
    pub voting_threshold: usize,
    /// Quorum is `ceil(registered / vote_divisor)` votes
    pub vote_divisor: usize,
    pub registration_fee: Amount,
    pub fee_policy: FeePolicy,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            voting_threshold: 4,
            vote_divisor: 2,
            registration_fee: 10 * UNIT,
            fee_policy: FeePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsuranceConfig {
    pub max_insurance_plan: Amount,
    /// Payout multiplier scaled by 100
    pub payout_percentage: u32,
}

impl Default for InsuranceConfig {
    fn default() -> Self {
        Self {
            max_insurance_plan: UNIT,
            payout_percentage: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub registration_fee: Amount,
    /// Matching reports needed to resolve a request
    pub min_responses: usize,
    /// Ignore repeat reports of the same status by the same oracle
    pub strict_dedup: bool,
    /// Let an oracle register again and receive fresh indexes
    pub allow_reregistration: bool,
    /// Blocks a request stays answerable; `None` keeps it open forever
    pub request_ttl_blocks: Option<u64>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            registration_fee: UNIT,
            min_responses: 3,
            strict_dedup: false,
            allow_reregistration: true,
            request_ttl_blocks: None,
        }
    }
}

/// Full protocol configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuretyConfig {
    pub admission: AdmissionConfig,
    pub insurance: InsuranceConfig,
    pub oracle: OracleConfig,
}

impl SuretyConfig {
    /// Load from an optional TOML file, then `FLIGHTSURETY__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: SuretyConfig = settings.try_deserialize()?;
        loaded.validated()
    }

    /// Parse a TOML document and validate it.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        let parsed: SuretyConfig = settings.try_deserialize()?;
        parsed.validated()
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Run the default validator, logging warnings and failing on errors.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let result = ConfigValidator::new().validate(&self);
        for warning in &result.warnings {
            warn!("Configuration warning: {}", warning);
        }
        if !result.is_valid() {
            return Err(ConfigError::Invalid(result.to_string()));
        }
        Ok(self)
    }
}
