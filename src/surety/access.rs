use log::info;
use std::collections::BTreeSet;

use crate::errors::{SuretyError, SuretyResult};
use crate::ledger::Principal;

/// Which checks a call must pass before it touches any state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Any caller while operational
    Operational,
    /// Owner only, regardless of the operational flag
    Owner,
    /// Owner only, while operational
    OwnerOperational,
    /// Owner or an allow-listed caller, while operational
    Authorized,
}

/// Operational switch, owner and caller allow-list
#[derive(Debug, Clone)]
pub struct AccessControl {
    owner: Principal,
    operational: bool,
    authorized: BTreeSet<Principal>,
}

impl AccessControl {
    pub fn new(owner: Principal) -> Self {
        AccessControl {
            owner,
            operational: true,
            authorized: BTreeSet::new(),
        }
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn is_authorized(&self, caller: &Principal) -> bool {
        caller == &self.owner || self.authorized.contains(caller)
    }

    pub fn authorized_callers(&self) -> impl Iterator<Item = &Principal> {
        self.authorized.iter()
    }

    pub fn check(&self, guard: Guard, caller: &Principal) -> SuretyResult<()> {
        match guard {
            Guard::Operational => self.require_operational(),
            Guard::Owner => self.require_owner(caller),
            Guard::OwnerOperational => {
                self.require_operational()?;
                self.require_owner(caller)
            }
            Guard::Authorized => {
                self.require_operational()?;
                if self.is_authorized(caller) {
                    Ok(())
                } else {
                    Err(SuretyError::Unauthorized(format!("{} is not an authorized caller", caller)))
                }
            }
        }
    }

    fn require_operational(&self) -> SuretyResult<()> {
        if self.operational {
            Ok(())
        } else {
            Err(SuretyError::NotOperational)
        }
    }

    fn require_owner(&self, caller: &Principal) -> SuretyResult<()> {
        if caller == &self.owner {
            Ok(())
        } else {
            Err(SuretyError::Unauthorized(format!("{} is not the contract owner", caller)))
        }
    }

    /// Returns true when the flag actually changed.
    pub fn set_operational(&mut self, operational: bool) -> bool {
        if self.operational == operational {
            return false;
        }
        self.operational = operational;
        info!("Operational status set to {}", operational);
        true
    }

    /// Returns true when the caller was not yet allow-listed.
    pub fn authorize(&mut self, caller: &Principal) -> bool {
        self.authorized.insert(*caller)
    }

    /// Returns true when the caller had been allow-listed.
    pub fn deauthorize(&mut self, caller: &Principal) -> bool {
        self.authorized.remove(caller)
    }
}
