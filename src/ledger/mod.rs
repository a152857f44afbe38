//! Ledger store: the single owner of every protocol entity.
//!
//! Engines never hold references into the store across calls; everything is
//! reached by key. Mutators check their own preconditions before touching any
//! map, so a rejected mutation leaves the store untouched.

pub mod keys;
pub mod types;

pub use keys::{FlightKey, RequestKey};
pub use types::*;

use log::debug;
use std::collections::BTreeMap;

use crate::errors::{SuretyError, SuretyResult};

#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    airlines: BTreeMap<Principal, Airline>,
    ballots: BTreeMap<Principal, PendingRegistration>,
    registered_count: usize,
    funded_count: usize,
    flights: BTreeMap<FlightKey, Flight>,
    claims: BTreeMap<FlightKey, Vec<InsuranceClaim>>,
    balances: BTreeMap<Principal, Amount>,
    oracles: BTreeMap<Principal, OracleRegistration>,
    requests: BTreeMap<RequestKey, ResponseInfo>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- airlines -----

    /// Airline record, zero-valued when never referenced before.
    pub fn airline(&self, id: &Principal) -> Airline {
        self.airlines.get(id).cloned().unwrap_or_default()
    }

    pub fn is_registered(&self, id: &Principal) -> bool {
        self.airlines.get(id).map_or(false, |a| a.registered)
    }

    pub fn is_funded(&self, id: &Principal) -> bool {
        self.airlines.get(id).map_or(false, |a| a.funded)
    }

    pub fn registered_count(&self) -> usize {
        self.registered_count
    }

    pub fn funded_count(&self) -> usize {
        self.funded_count
    }

    /// Record the display name an airline was proposed under.
    pub fn name_airline(&mut self, id: &Principal, name: &str) {
        let airline = self.airlines.entry(*id).or_default();
        if airline.name.is_empty() {
            airline.name = name.to_string();
        }
    }

    /// Admit an airline and consume its ballot.
    pub fn register_airline(&mut self, id: &Principal) -> SuretyResult<()> {
        if self.is_registered(id) {
            return Err(SuretyError::AlreadyRegistered);
        }
        self.airlines.entry(*id).or_default().registered = true;
        self.ballots.remove(id);
        self.registered_count += 1;
        debug!("Airline {} registered, {} total", id, self.registered_count);
        Ok(())
    }

    pub fn ballot(&self, candidate: &Principal) -> Option<&PendingRegistration> {
        self.ballots.get(candidate)
    }

    pub fn ballot_size(&self, candidate: &Principal) -> usize {
        self.ballots.get(candidate).map_or(0, |b| b.voters.len())
    }

    pub fn has_voted(&self, candidate: &Principal, voter: &Principal) -> bool {
        self.ballots
            .get(candidate)
            .map_or(false, |b| b.voters.contains(voter))
    }

    /// Add a vote and return the new ballot size.
    pub fn record_vote(&mut self, candidate: &Principal, voter: &Principal) -> SuretyResult<usize> {
        if self.has_voted(candidate, voter) {
            return Err(SuretyError::DuplicateVote);
        }
        let ballot = self.ballots.entry(*candidate).or_default();
        ballot.voters.insert(*voter);
        Ok(ballot.voters.len())
    }

    pub fn mark_funded(&mut self, id: &Principal, contribution: Amount) -> SuretyResult<()> {
        let airline = self.airlines.get_mut(id).ok_or(SuretyError::NotRegistered)?;
        if !airline.registered {
            return Err(SuretyError::NotRegistered);
        }
        if airline.funded {
            return Err(SuretyError::AlreadyFunded);
        }
        airline.funded = true;
        airline.contributed = airline.contributed.saturating_add(contribution);
        self.funded_count += 1;
        Ok(())
    }

    /// Undo `mark_funded` when the rest of a funding call cannot complete.
    pub fn revoke_funding(&mut self, id: &Principal, contribution: Amount) {
        if let Some(airline) = self.airlines.get_mut(id) {
            if airline.funded {
                airline.funded = false;
                airline.contributed = airline.contributed.saturating_sub(contribution);
                self.funded_count -= 1;
            }
        }
    }

    // ----- flights -----

    pub fn flight(&self, key: &FlightKey) -> Option<&Flight> {
        self.flights.get(key)
    }

    pub fn flight_count(&self) -> usize {
        self.flights.len()
    }

    pub fn flights(&self) -> impl Iterator<Item = (&FlightKey, &Flight)> {
        self.flights.iter()
    }

    pub fn flights_of<'a>(&'a self, airline: &'a Principal) -> impl Iterator<Item = (&'a FlightKey, &'a Flight)> + 'a {
        self.flights.iter().filter(move |(_, f)| &f.airline == airline)
    }

    pub fn insert_flight(&mut self, flight: Flight) -> SuretyResult<FlightKey> {
        if !self.is_funded(&flight.airline) {
            return Err(SuretyError::NotFunded);
        }
        let key = FlightKey::derive(&flight.airline, &flight.flight_number, flight.timestamp);
        if self.flights.contains_key(&key) {
            return Err(SuretyError::FlightAlreadyRegistered);
        }
        self.flights.insert(key, flight);
        Ok(key)
    }

    /// Finalize a flight's status. Returns `false` when it had already landed.
    pub fn set_flight_status(&mut self, key: &FlightKey, status: FlightStatus) -> SuretyResult<bool> {
        let flight = self.flights.get_mut(key).ok_or(SuretyError::FlightNotFound)?;
        if flight.is_landed() {
            return Ok(false);
        }
        flight.status = status;
        Ok(true)
    }

    // ----- insurance -----

    pub fn claims(&self, key: &FlightKey) -> &[InsuranceClaim] {
        self.claims.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn claim(&self, key: &FlightKey, passenger: &Principal) -> Option<&InsuranceClaim> {
        self.claims(key).iter().find(|c| &c.passenger == passenger)
    }

    pub fn insert_claim(&mut self, key: &FlightKey, claim: InsuranceClaim) -> SuretyResult<()> {
        let flight = self.flights.get(key).ok_or(SuretyError::FlightNotFound)?;
        if flight.is_landed() {
            return Err(SuretyError::FlightLanded);
        }
        if self.claim(key, &claim.passenger).is_some() {
            return Err(SuretyError::DuplicateInsurance);
        }
        self.claims.entry(*key).or_default().push(claim);
        Ok(())
    }

    /// Credit every uncredited claim on a flight exactly once.
    ///
    /// Returns `(passenger, payout)` for each claim credited by this call.
    pub fn credit_claims(&mut self, key: &FlightKey) -> Vec<(Principal, Amount)> {
        let mut credited = Vec::new();
        if let Some(claims) = self.claims.get_mut(key) {
            for claim in claims.iter_mut().filter(|c| !c.credited) {
                let payout = claim.payout();
                claim.credited = true;
                let balance = self.balances.entry(claim.passenger).or_insert(0);
                *balance = balance.saturating_add(payout);
                credited.push((claim.passenger, payout));
            }
        }
        credited
    }

    // ----- balances -----

    pub fn balance(&self, passenger: &Principal) -> Amount {
        self.balances.get(passenger).copied().unwrap_or(0)
    }

    pub fn total_withdrawable(&self) -> Amount {
        self.balances.values().fold(0, |acc, v| acc.saturating_add(*v))
    }

    /// Zero a passenger's balance and hand back what it held.
    pub fn take_balance(&mut self, passenger: &Principal) -> SuretyResult<Amount> {
        match self.balances.remove(passenger) {
            Some(amount) if amount > 0 => Ok(amount),
            _ => Err(SuretyError::NoWithdrawableBalance),
        }
    }

    /// Undo a `take_balance` whose transfer could not be completed.
    pub fn restore_balance(&mut self, passenger: &Principal, amount: Amount) {
        let balance = self.balances.entry(*passenger).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    // ----- oracles -----

    pub fn oracle(&self, oracle: &Principal) -> Option<&OracleRegistration> {
        self.oracles.get(oracle)
    }

    pub fn oracle_count(&self) -> usize {
        self.oracles.len()
    }

    pub fn put_oracle(&mut self, oracle: &Principal, registration: OracleRegistration) {
        self.oracles.insert(*oracle, registration);
    }

    pub fn request(&self, key: &RequestKey) -> Option<&ResponseInfo> {
        self.requests.get(key)
    }

    pub fn request_mut(&mut self, key: &RequestKey) -> Option<&mut ResponseInfo> {
        self.requests.get_mut(key)
    }

    pub fn open_request_count(&self) -> usize {
        self.requests.values().filter(|r| r.open).count()
    }

    pub fn put_request(&mut self, key: RequestKey, info: ResponseInfo) {
        self.requests.insert(key, info);
    }
}

#[cfg(test)]
mod tests;
