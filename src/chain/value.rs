use log::trace;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::ValueLedger;
use crate::errors::{SuretyError, SuretyResult};
use crate::ledger::{Amount, Principal};

/// Simple account-balance ledger held in memory.
#[derive(Debug, Default)]
pub struct InMemoryValueLedger {
    balances: RwLock<HashMap<Principal, Amount>>,
}

impl InMemoryValueLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint `amount` into an account. Used to seed test and simulation wallets.
    pub fn mint(&self, account: &Principal, amount: Amount) {
        let mut balances = self.balances.write();
        let balance = balances.entry(*account).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn total_supply(&self) -> Amount {
        self.balances.read().values().fold(0, |acc, v| acc.saturating_add(*v))
    }
}

impl ValueLedger for InMemoryValueLedger {
    fn balance_of(&self, account: &Principal) -> Amount {
        self.balances.read().get(account).copied().unwrap_or(0)
    }

    fn credit(&self, account: &Principal, amount: Amount) -> SuretyResult<()> {
        let mut balances = self.balances.write();
        let balance = balances.entry(*account).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| SuretyError::Transfer("balance overflow".to_string()))?;
        Ok(())
    }

    fn debit(&self, account: &Principal, amount: Amount) -> SuretyResult<()> {
        let mut balances = self.balances.write();
        let available = balances.get(account).copied().unwrap_or(0);
        if available < amount {
            return Err(SuretyError::InsufficientFunds {
                required: amount,
                available,
            });
        }
        balances.insert(*account, available - amount);
        Ok(())
    }

    fn transfer(&self, from: &Principal, to: &Principal, amount: Amount) -> SuretyResult<()> {
        let mut balances = self.balances.write();
        let available = balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(SuretyError::InsufficientFunds {
                required: amount,
                available,
            });
        }
        let target = balances.get(to).copied().unwrap_or(0);
        let credited = target
            .checked_add(amount)
            .ok_or_else(|| SuretyError::Transfer("balance overflow".to_string()))?;
        if from != to {
            balances.insert(*from, available - amount);
            balances.insert(*to, credited);
        }
        trace!("Transferred {} from {} to {}", amount, from, to);
        Ok(())
    }
}
