//! Oracle consensus: index assignment, request tracking, response
//! aggregation and dispatch of the agreed status into the insurance engine.

pub mod consensus;
pub mod fleet;
pub mod index;

pub use consensus::{OracleConsensus, OracleTicket, ResponseOutcome};
pub use fleet::{FleetReport, OracleFleet, StatusStrategy};
pub use index::IndexGenerator;

/// Indexes are drawn from `[0, MAX_INDEX)`
pub const MAX_INDEX: u8 = 10;

pub const INDEXES_PER_ORACLE: usize = 3;

#[cfg(test)]
mod tests;
