//! Airline admission: unanimous bootstrap, then quorum voting by funded
//! airlines, then funding against the registration fee.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::chain::SuretyEvent;
use crate::config::{AdmissionConfig, FeePolicy};
use crate::errors::{SuretyError, SuretyResult};
use crate::ledger::{Amount, LedgerStore, Principal};

/// Result of a registration request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    pub admitted: bool,
    /// Ballot size when voting applied; 0 on the bootstrap path
    pub votes: usize,
    /// Registered airlines after the call
    pub total_airlines: usize,
}

/// How a funding payment is split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingReceipt {
    pub contributed: Amount,
    pub refund: Amount,
}

#[derive(Debug, Clone)]
pub struct AdmissionController {
    config: AdmissionConfig,
}

impl AdmissionController {
    pub fn new(config: AdmissionConfig) -> Self {
        AdmissionController { config }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Votes needed to admit a candidate when `registered` airlines exist.
    ///
    /// `vote_divisor` is non-zero in any validated configuration.
    pub fn required_votes(&self, registered: usize) -> usize {
        let divisor = self.config.vote_divisor;
        (registered + divisor - 1) / divisor
    }

    /// Propose `candidate` on behalf of the funded airline `caller`.
    pub fn request_registration(
        &self,
        store: &mut LedgerStore,
        candidate: &Principal,
        name: &str,
        caller: &Principal,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<RegistrationOutcome> {
        if store.is_registered(candidate) {
            return Err(SuretyError::AlreadyRegistered);
        }
        if !store.is_registered(caller) || !store.is_funded(caller) {
            return Err(SuretyError::CallerNotFunded);
        }

        let registered = store.registered_count();
        if registered < self.config.voting_threshold {
            store.name_airline(candidate, name);
            store.register_airline(candidate)?;
            info!("Airline {} ({}) admitted without vote", candidate, name);
            events.push(SuretyEvent::AirlineRegistered {
                airline: *candidate,
                name: name.to_string(),
                votes: 0,
            });
            return Ok(RegistrationOutcome {
                admitted: true,
                votes: 0,
                total_airlines: store.registered_count(),
            });
        }

        if store.has_voted(candidate, caller) {
            return Err(SuretyError::DuplicateVote);
        }
        store.name_airline(candidate, name);
        let votes = store.record_vote(candidate, caller)?;
        let required = self.required_votes(registered);

        if votes >= required {
            store.register_airline(candidate)?;
            info!(
                "Airline {} ({}) admitted with {}/{} votes",
                candidate, name, votes, registered
            );
            events.push(SuretyEvent::AirlineRegistered {
                airline: *candidate,
                name: store.airline(candidate).name,
                votes,
            });
            Ok(RegistrationOutcome {
                admitted: true,
                votes,
                total_airlines: store.registered_count(),
            })
        } else {
            debug!("Vote {} -> {} recorded, {}/{}", caller, candidate, votes, required);
            events.push(SuretyEvent::AirlineVoteRecorded {
                candidate: *candidate,
                voter: *caller,
                votes,
                required,
            });
            Ok(RegistrationOutcome {
                admitted: false,
                votes,
                total_airlines: registered,
            })
        }
    }

    /// Check a funding payment and work out how it splits under the fee policy.
    /// Does not touch the store.
    pub fn assess_funding(
        &self,
        store: &LedgerStore,
        airline: &Principal,
        amount: Amount,
    ) -> SuretyResult<FundingReceipt> {
        if !store.is_registered(airline) {
            return Err(SuretyError::NotRegistered);
        }
        if store.is_funded(airline) {
            return Err(SuretyError::AlreadyFunded);
        }
        let fee = self.config.registration_fee;
        if amount < fee {
            return Err(SuretyError::InsufficientFee {
                required: fee,
                offered: amount,
            });
        }

        match self.config.fee_policy {
            FeePolicy::AcceptExcess => Ok(FundingReceipt {
                contributed: amount,
                refund: 0,
            }),
            FeePolicy::RefundExcess => Ok(FundingReceipt {
                contributed: fee,
                refund: amount - fee,
            }),
            FeePolicy::RequireExact if amount != fee => Err(SuretyError::InvalidAmount(format!(
                "exactly {} required, {} offered",
                fee, amount
            ))),
            FeePolicy::RequireExact => Ok(FundingReceipt {
                contributed: fee,
                refund: 0,
            }),
        }
    }

    /// Apply an assessed funding payment.
    pub fn commit_funding(
        &self,
        store: &mut LedgerStore,
        airline: &Principal,
        receipt: &FundingReceipt,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<()> {
        store.mark_funded(airline, receipt.contributed)?;
        info!(
            "Airline {} funded with {} ({} funded airlines)",
            airline,
            receipt.contributed,
            store.funded_count()
        );
        events.push(SuretyEvent::AirlineFunded {
            airline: *airline,
            amount: receipt.contributed,
        });
        Ok(())
    }

    /// Assess and commit in one step, for callers that move no value.
    pub fn fund(
        &self,
        store: &mut LedgerStore,
        airline: &Principal,
        amount: Amount,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<FundingReceipt> {
        let receipt = self.assess_funding(store, airline, amount)?;
        self.commit_funding(store, airline, &receipt, events)?;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests;
