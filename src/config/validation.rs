use std::collections::BTreeMap;
use std::fmt;
use log::{debug, error};
use thiserror::Error;

use super::{FeePolicy, SuretyConfig};
use crate::ledger::Amount;

/// Error type for configuration validation issues
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Incompatible settings: {0}")]
    IncompatibleSettings(String),

    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),
}

/// Outcome of running every rule over one configuration
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    /// Accepted, but weaker than the hardened profile
    pub warnings: Vec<String>,
    /// Suggested value per failing setting
    pub suggested_fixes: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// One line per error, warning and suggested fix
impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() && self.warnings.is_empty() {
            return write!(f, "no issues");
        }
        for error in &self.errors {
            writeln!(f, "error: {}", error)?;
        }
        for warning in &self.warnings {
            writeln!(f, "warning: {}", warning)?;
        }
        for (setting, suggestion) in &self.suggested_fixes {
            writeln!(f, "fix {}: {}", setting, suggestion)?;
        }
        Ok(())
    }
}

/// Configuration validation rule
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &str;

    fn validate(&self, config: &SuretyConfig) -> Result<(), ConfigValidationError>;

    /// Setting name and suggestion to record when the rule fails
    fn suggest_fix(&self, config: &SuretyConfig) -> Option<(String, String)>;
}

/// Applies every registered rule to a configuration
pub struct ConfigValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ConfigValidator {
    /// Create a validator with the default rules
    pub fn new() -> Self {
        let mut validator = Self { rules: Vec::new() };
        validator.add_rule(Box::new(VotingRule));
        validator.add_rule(Box::new(InsurancePlanRule));
        validator.add_rule(Box::new(OracleQuorumRule));
        validator.add_rule(Box::new(RequestTtlRule));
        validator
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn validate(&self, config: &SuretyConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        for rule in &self.rules {
            match rule.validate(config) {
                Ok(()) => debug!("Validation rule '{}' passed", rule.name()),
                Err(err) => {
                    error!("Validation rule '{}' failed: {}", rule.name(), err);
                    result.errors.push(err);
                    if let Some((setting, suggestion)) = rule.suggest_fix(config) {
                        result.suggested_fixes.insert(setting, suggestion);
                    }
                }
            }
        }

        if config.oracle.min_responses == 1 {
            result
                .warnings
                .push("A single oracle report resolves a flight status.".to_string());
        }
        if !config.oracle.strict_dedup {
            result.warnings.push(
                "Oracle reports are not deduplicated; one oracle can reach quorum alone by repeating itself."
                    .to_string(),
            );
        }
        if config.admission.fee_policy == FeePolicy::AcceptExcess {
            debug!("Registration fee overpayment is kept as contribution");
        }

        result
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

struct VotingRule;

impl ValidationRule for VotingRule {
    fn name(&self) -> &str {
        "Voting"
    }

    fn validate(&self, config: &SuretyConfig) -> Result<(), ConfigValidationError> {
        if config.admission.vote_divisor == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "admission.vote_divisor must be greater than zero".to_string(),
            ));
        }
        if config.admission.voting_threshold == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "admission.voting_threshold must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn suggest_fix(&self, _config: &SuretyConfig) -> Option<(String, String)> {
        Some(("admission".to_string(), "Use voting_threshold = 4 and vote_divisor = 2".to_string()))
    }
}

struct InsurancePlanRule;

impl ValidationRule for InsurancePlanRule {
    fn name(&self) -> &str {
        "InsurancePlan"
    }

    fn validate(&self, config: &SuretyConfig) -> Result<(), ConfigValidationError> {
        if config.insurance.max_insurance_plan == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "insurance.max_insurance_plan must be greater than zero".to_string(),
            ));
        }
        if config.insurance.payout_percentage < 100 {
            return Err(ConfigValidationError::ValueOutOfRange(format!(
                "insurance.payout_percentage {} pays out less than the premium",
                config.insurance.payout_percentage
            )));
        }
        // The largest payout must fit an amount
        let largest = u128::from(config.insurance.max_insurance_plan)
            * u128::from(config.insurance.payout_percentage)
            / 100;
        if largest > u128::from(Amount::MAX) {
            return Err(ConfigValidationError::IncompatibleSettings(format!(
                "insurance.max_insurance_plan {} at payout_percentage {} overflows a payout",
                config.insurance.max_insurance_plan, config.insurance.payout_percentage
            )));
        }
        Ok(())
    }

    fn suggest_fix(&self, _config: &SuretyConfig) -> Option<(String, String)> {
        Some(("insurance.payout_percentage".to_string(), "Use 150 (1.5x payout)".to_string()))
    }
}

struct OracleQuorumRule;

impl ValidationRule for OracleQuorumRule {
    fn name(&self) -> &str {
        "OracleQuorum"
    }

    fn validate(&self, config: &SuretyConfig) -> Result<(), ConfigValidationError> {
        if config.oracle.min_responses == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "oracle.min_responses must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn suggest_fix(&self, _config: &SuretyConfig) -> Option<(String, String)> {
        Some(("oracle.min_responses".to_string(), "Use 3 matching reports".to_string()))
    }
}

struct RequestTtlRule;

impl ValidationRule for RequestTtlRule {
    fn name(&self) -> &str {
        "RequestTtl"
    }

    fn validate(&self, config: &SuretyConfig) -> Result<(), ConfigValidationError> {
        if config.oracle.request_ttl_blocks == Some(0) {
            return Err(ConfigValidationError::IncompatibleSettings(
                "oracle.request_ttl_blocks = 0 expires requests before any oracle can answer".to_string(),
            ));
        }
        Ok(())
    }

    fn suggest_fix(&self, _config: &SuretyConfig) -> Option<(String, String)> {
        Some(("oracle.request_ttl_blocks".to_string(), "Remove it or use 256".to_string()))
    }
}
