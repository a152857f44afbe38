//! Collaborators supplied by the hosting ledger: block height and hashes,
//! value balances, and the ordered event sink.

pub mod block;
pub mod events;
pub mod value;

pub use block::SimulatedChain;
pub use events::{EventLog, EventRecord, SuretyEvent};
pub use value::InMemoryValueLedger;

use crate::errors::SuretyResult;
use crate::ledger::{Amount, Principal};

/// Monotonic height plus access to recent block hashes.
#[cfg_attr(test, mockall::automock)]
pub trait BlockSource: Send + Sync {
    /// Current (not yet sealed) block height
    fn height(&self) -> u64;

    /// Hash of a sealed block. `None` for the current block, future blocks and
    /// anything past the retention window.
    fn block_hash(&self, height: u64) -> Option<[u8; 32]>;
}

/// Balance per principal with all-or-nothing movements.
#[cfg_attr(test, mockall::automock)]
pub trait ValueLedger: Send + Sync {
    fn balance_of(&self, account: &Principal) -> Amount;

    fn credit(&self, account: &Principal, amount: Amount) -> SuretyResult<()>;

    /// Fails without effect when the account cannot cover `amount`.
    fn debit(&self, account: &Principal, amount: Amount) -> SuretyResult<()>;

    fn transfer(&self, from: &Principal, to: &Principal, amount: Amount) -> SuretyResult<()>;
}

/// Append-only destination for the events of successful operations.
pub trait EventSink: Send + Sync {
    fn publish(&self, height: u64, events: Vec<SuretyEvent>);
}

#[cfg(test)]
mod tests;
