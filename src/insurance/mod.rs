//! Flight registration, bounded insurance purchase, crediting and
//! withdrawal planning.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::chain::SuretyEvent;
use crate::config::InsuranceConfig;
use crate::errors::{SuretyError, SuretyResult};
use crate::ledger::{
    Amount, Flight, FlightKey, FlightStatus, InsuranceClaim, LedgerStore, Principal,
};

/// Airline-supplied details of a new flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRegistration {
    pub flight_number: String,
    pub timestamp: u64,
    pub departure: String,
    pub arrival: String,
}

impl FlightRegistration {
    pub fn new(flight_number: &str, timestamp: u64, departure: &str, arrival: &str) -> Self {
        Self {
            flight_number: flight_number.to_string(),
            timestamp,
            departure: departure.to_string(),
            arrival: arrival.to_string(),
        }
    }
}

/// What a status application did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOutcome {
    /// False when the flight had already landed and nothing changed
    pub applied: bool,
    /// Passengers credited by this application
    pub credited: Vec<(Principal, Amount)>,
}

#[derive(Debug, Clone)]
pub struct InsuranceEngine {
    config: InsuranceConfig,
}

impl InsuranceEngine {
    pub fn new(config: InsuranceConfig) -> Self {
        InsuranceEngine { config }
    }

    pub fn config(&self) -> &InsuranceConfig {
        &self.config
    }

    pub fn register_flight(
        &self,
        store: &mut LedgerStore,
        height: u64,
        airline: &Principal,
        registration: FlightRegistration,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<FlightKey> {
        if !store.is_registered(airline) {
            return Err(SuretyError::NotRegistered);
        }
        if !store.is_funded(airline) {
            return Err(SuretyError::NotFunded);
        }

        let FlightRegistration {
            flight_number,
            timestamp,
            departure,
            arrival,
        } = registration;
        let key = store.insert_flight(Flight {
            airline: *airline,
            flight_number: flight_number.clone(),
            timestamp,
            departure,
            arrival,
            status: FlightStatus::Unknown,
            registered_at: height,
        })?;

        info!("Flight {} of {} registered as {}", flight_number, airline, key);
        events.push(SuretyEvent::FlightRegistered {
            key,
            airline: *airline,
            flight_number,
            timestamp,
        });
        Ok(key)
    }

    pub fn buy_insurance(
        &self,
        store: &mut LedgerStore,
        key: &FlightKey,
        passenger: &Principal,
        amount: Amount,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<()> {
        let flight = store.flight(key).ok_or(SuretyError::FlightNotFound)?;
        if flight.is_landed() {
            return Err(SuretyError::FlightLanded);
        }
        if store.claim(key, passenger).is_some() {
            return Err(SuretyError::DuplicateInsurance);
        }
        let cap = self.config.max_insurance_plan;
        if amount == 0 || amount > cap {
            return Err(SuretyError::InsuranceCapExceeded {
                offered: amount,
                cap,
            });
        }

        store.insert_claim(
            key,
            InsuranceClaim {
                passenger: *passenger,
                purchase_price: amount,
                payout_percentage: self.config.payout_percentage,
                credited: false,
            },
        )?;
        debug!("Passenger {} insured {} on {}", passenger, amount, key);
        events.push(SuretyEvent::PassengerInsured {
            key: *key,
            passenger: *passenger,
            amount,
        });
        Ok(())
    }

    /// Finalize a flight's status, crediting insurees on airline-fault delays.
    ///
    /// A landed flight is left untouched: the first applied status wins.
    pub fn apply_flight_status(
        &self,
        store: &mut LedgerStore,
        key: &FlightKey,
        status: FlightStatus,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<StatusOutcome> {
        if !store.set_flight_status(key, status)? {
            debug!("Flight {} already landed, ignoring {}", key, status);
            return Ok(StatusOutcome::default());
        }

        let mut outcome = StatusOutcome {
            applied: true,
            credited: Vec::new(),
        };
        if status.is_airline_fault() {
            outcome.credited = store.credit_claims(key);
            for (passenger, amount) in &outcome.credited {
                events.push(SuretyEvent::InsureeCredited {
                    key: *key,
                    passenger: *passenger,
                    amount: *amount,
                });
            }
            info!(
                "Flight {} delayed ({}), credited {} insurees",
                key,
                status,
                outcome.credited.len()
            );
        }
        events.push(SuretyEvent::ProcessedFlightStatus { key: *key, status });
        Ok(outcome)
    }

    /// Zero a passenger's balance for payout from a pool holding `pool_available`.
    ///
    /// The caller transfers the returned amount and restores the balance if
    /// that transfer fails.
    pub fn begin_withdrawal(
        &self,
        store: &mut LedgerStore,
        passenger: &Principal,
        pool_available: Amount,
    ) -> SuretyResult<Amount> {
        let owed = store.balance(passenger);
        if owed == 0 {
            return Err(SuretyError::NoWithdrawableBalance);
        }
        if pool_available < owed {
            warn!("Pool cannot cover withdrawal of {} (holds {})", owed, pool_available);
            return Err(SuretyError::InsufficientPoolFunds {
                required: owed,
                available: pool_available,
            });
        }
        store.take_balance(passenger)
    }
}

#[cfg(test)]
mod tests;
