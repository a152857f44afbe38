use thiserror::Error;

use crate::ledger::Amount;

/// Every way a protocol operation can be rejected.
///
/// A returned error always means the call left the ledger, the value ledger
/// and the event log exactly as it found them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuretyError {
    #[error("Contract is currently not operational")]
    NotOperational,

    #[error("Caller is not authorized: {0}")]
    Unauthorized(String),

    #[error("Airline is not registered")]
    NotRegistered,

    #[error("Airline is already registered")]
    AlreadyRegistered,

    #[error("Airline has not been funded")]
    NotFunded,

    #[error("Airline is already funded")]
    AlreadyFunded,

    #[error("Calling airline is not a funded, registered airline")]
    CallerNotFunded,

    #[error("Fee of {required} required, {offered} offered")]
    InsufficientFee { required: Amount, offered: Amount },

    #[error("Caller has already voted for this airline")]
    DuplicateVote,

    #[error("Flight is not registered")]
    FlightNotFound,

    #[error("Flight is already registered")]
    FlightAlreadyRegistered,

    #[error("Flight has already landed")]
    FlightLanded,

    #[error("Passenger already holds insurance for this flight")]
    DuplicateInsurance,

    #[error("Insurance amount {offered} outside (0, {cap}]")]
    InsuranceCapExceeded { offered: Amount, cap: Amount },

    #[error("No withdrawable balance")]
    NoWithdrawableBalance,

    #[error("Pool holds {available}, {required} required")]
    InsufficientPoolFunds { required: Amount, available: Amount },

    #[error("Payer holds {available}, {required} required")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Oracle is not registered")]
    OracleNotRegistered,

    #[error("Oracle is already registered")]
    OracleAlreadyRegistered,

    #[error("Index does not match oracle request")]
    IndexMismatch,

    #[error("Flight or timestamp do not match an open oracle request")]
    RequestNotOpen,

    #[error("Oracle request expired at height {expired_at}")]
    RequestExpired { expired_at: u64 },

    #[error("Oracle already reported this status")]
    DuplicateResponse,

    #[error("Could not derive a distinct oracle index after {attempts} draws")]
    IndexDerivationExhausted { attempts: usize },

    #[error("Value transfer failed: {0}")]
    Transfer(String),
}

/// Result alias used by every protocol operation.
pub type SuretyResult<T> = Result<T, SuretyError>;

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Invalid configuration:\n{0}")]
    Invalid(String),
}
