//! Flight-delay insurance ledger.
//!
//! Airlines join through a unanimous bootstrap and then quorum voting, fund
//! themselves, and register flights. Passengers buy capped cover on those
//! flights. Registered oracles report flight statuses; once enough reports
//! agree, the status is final and airline-fault delays credit insurees, who
//! withdraw from the shared pool.

pub mod admission;
pub mod chain;
pub mod config;
pub mod errors;
pub mod insurance;
pub mod ledger;
pub mod oracle;
pub mod surety;

// Re-export commonly used items
pub use crate::chain::{BlockSource, EventLog, EventSink, SuretyEvent, ValueLedger};
pub use crate::config::{ProtocolProfile, SuretyConfig};
pub use crate::errors::{ConfigError, SuretyError, SuretyResult};
pub use crate::insurance::FlightRegistration;
pub use crate::ledger::{Amount, FlightKey, FlightRef, FlightStatus, Principal, UNIT};
pub use crate::surety::{CallContext, FlightSurety, FlightSuretyBuilder, SuretySnapshot};
