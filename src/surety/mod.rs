//! The protocol facade.
//!
//! `FlightSurety` serializes every operation behind one lock, checks access
//! guards, moves attached value into the pool, runs the engines against the
//! ledger store and publishes the buffered events only once the operation
//! has succeeded. A failed operation returns the attached value to the caller
//! and leaves the store exactly as it was.

mod access;

pub use access::{AccessControl, Guard};

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::admission::{AdmissionController, FundingReceipt, RegistrationOutcome};
use crate::chain::block::BLOCK_HASH_WINDOW;
use crate::chain::{
    BlockSource, EventLog, EventSink, InMemoryValueLedger, SimulatedChain, SuretyEvent, ValueLedger,
};
use crate::config::{ProtocolProfile, SuretyConfig};
use crate::errors::{ConfigError, SuretyError, SuretyResult};
use crate::insurance::{FlightRegistration, InsuranceEngine, StatusOutcome};
use crate::ledger::{
    Airline, Amount, Flight, FlightKey, FlightRef, FlightStatus, InsuranceClaim, LedgerStore,
    Principal, RequestKey, ResponseInfo,
};
use crate::oracle::{OracleConsensus, OracleTicket, ResponseOutcome, INDEXES_PER_ORACLE};

/// Label the default pool account is derived from
pub const POOL_LABEL: &str = "flightsurety.pool";

/// Who is calling and how much value is attached to the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Principal,
    pub value: Amount,
}

impl CallContext {
    pub fn new(caller: Principal) -> Self {
        CallContext { caller, value: 0 }
    }

    pub fn with_value(caller: Principal, value: Amount) -> Self {
        CallContext { caller, value }
    }
}

/// Read-only summary of the whole protocol state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuretySnapshot {
    pub operational: bool,
    pub owner: Principal,
    /// Allow-listed callers besides the owner
    pub authorized: Vec<Principal>,
    pub pool: Principal,
    pub pool_balance: Amount,
    pub registered_airlines: usize,
    pub funded_airlines: usize,
    pub flights: usize,
    pub landed_flights: usize,
    pub oracles: usize,
    pub open_requests: usize,
    pub total_withdrawable: Amount,
    pub profile: Option<ProtocolProfile>,
}

struct SuretyState {
    config: SuretyConfig,
    access: AccessControl,
    store: LedgerStore,
    admission: AdmissionController,
    insurance: InsuranceEngine,
    oracles: OracleConsensus,
}

/// Per-call environment handed to an operation body
struct Tx<'a> {
    caller: Principal,
    value: Amount,
    height: u64,
    pool: Principal,
    blocks: &'a dyn BlockSource,
    values: &'a dyn ValueLedger,
}

pub struct FlightSuretyBuilder {
    owner: Principal,
    first_airline: Option<(Principal, String)>,
    config: SuretyConfig,
    pool: Principal,
    blocks: Option<Arc<dyn BlockSource>>,
    values: Option<Arc<dyn ValueLedger>>,
    events: Option<Arc<dyn EventSink>>,
}

impl FlightSuretyBuilder {
    pub fn new(owner: Principal) -> Self {
        FlightSuretyBuilder {
            owner,
            first_airline: None,
            config: SuretyConfig::default(),
            pool: Principal::from_label(POOL_LABEL),
            blocks: None,
            values: None,
            events: None,
        }
    }

    pub fn config(mut self, config: SuretyConfig) -> Self {
        self.config = config;
        self
    }

    /// Airline registered at construction. Defaults to the owner.
    pub fn first_airline(mut self, airline: Principal, name: &str) -> Self {
        self.first_airline = Some((airline, name.to_string()));
        self
    }

    pub fn pool(mut self, pool: Principal) -> Self {
        self.pool = pool;
        self
    }

    pub fn blocks(mut self, blocks: Arc<dyn BlockSource>) -> Self {
        self.blocks = Some(blocks);
        self
    }

    pub fn values(mut self, values: Arc<dyn ValueLedger>) -> Self {
        self.values = Some(values);
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Validate the configuration and deploy.
    pub fn build(self) -> Result<FlightSurety, ConfigError> {
        let config = self.config.validated()?;
        // Start past the hash window so index draws have real seeds
        let blocks = self.blocks.unwrap_or_else(|| {
            Arc::new(SimulatedChain::at_height("flightsurety", 2 * BLOCK_HASH_WINDOW))
        });
        let values = self
            .values
            .unwrap_or_else(|| Arc::new(InMemoryValueLedger::new()));
        let events = self.events.unwrap_or_else(|| Arc::new(EventLog::new()));
        let (first, name) = self
            .first_airline
            .unwrap_or_else(|| (self.owner, String::from("Genesis Airline")));

        let mut store = LedgerStore::new();
        store.name_airline(&first, &name);
        // A fresh store cannot already hold the airline
        if let Err(err) = store.register_airline(&first) {
            warn!("First airline {} not registered: {}", first, err);
        }
        events.publish(
            blocks.height(),
            vec![SuretyEvent::AirlineRegistered {
                airline: first,
                name: name.clone(),
                votes: 0,
            }],
        );
        info!(
            "FlightSurety deployed by {} with first airline {} ({})",
            self.owner, first, name
        );

        Ok(FlightSurety {
            state: Mutex::new(SuretyState {
                access: AccessControl::new(self.owner),
                store,
                admission: AdmissionController::new(config.admission.clone()),
                insurance: InsuranceEngine::new(config.insurance.clone()),
                oracles: OracleConsensus::new(config.oracle.clone()),
                config,
            }),
            pool: self.pool,
            blocks,
            values,
            events,
        })
    }
}

pub struct FlightSurety {
    state: Mutex<SuretyState>,
    pool: Principal,
    blocks: Arc<dyn BlockSource>,
    values: Arc<dyn ValueLedger>,
    events: Arc<dyn EventSink>,
}

impl FlightSurety {
    pub fn builder(owner: Principal) -> FlightSuretyBuilder {
        FlightSuretyBuilder::new(owner)
    }

    /// Run `op` as one atomic call.
    fn transact<T>(
        &self,
        ctx: &CallContext,
        guard: Guard,
        payable: bool,
        op: impl FnOnce(&mut SuretyState, &Tx<'_>, &mut Vec<SuretyEvent>) -> SuretyResult<T>,
    ) -> SuretyResult<T> {
        let mut state = self.state.lock();
        state.access.check(guard, &ctx.caller)?;
        if !payable && ctx.value > 0 {
            return Err(SuretyError::InvalidAmount(format!(
                "call does not accept value, {} attached",
                ctx.value
            )));
        }

        let tx = Tx {
            caller: ctx.caller,
            value: ctx.value,
            height: self.blocks.height(),
            pool: self.pool,
            blocks: self.blocks.as_ref(),
            values: self.values.as_ref(),
        };
        if tx.value > 0 {
            self.values.transfer(&tx.caller, &tx.pool, tx.value)?;
        }

        let mut events = Vec::new();
        match op(&mut *state, &tx, &mut events) {
            Ok(result) => {
                if !events.is_empty() {
                    self.events.publish(tx.height, events);
                }
                Ok(result)
            }
            Err(err) => {
                if tx.value > 0 {
                    if let Err(refund) = self.values.transfer(&tx.pool, &tx.caller, tx.value) {
                        error!(
                            "Could not return {} to {} after failed call: {}",
                            tx.value, tx.caller, refund
                        );
                        return Err(SuretyError::Transfer(format!(
                            "{}; returning {} to {} failed: {}",
                            err, tx.value, tx.caller, refund
                        )));
                    }
                }
                debug!("Call from {} rejected: {}", tx.caller, err);
                Err(err)
            }
        }
    }

    // ----- access control -----

    /// Pause or resume the protocol. Owner only, allowed while paused.
    pub fn set_operational(&self, ctx: &CallContext, operational: bool) -> SuretyResult<()> {
        self.transact(ctx, Guard::Owner, false, |state, _, events| {
            if state.access.set_operational(operational) {
                events.push(SuretyEvent::OperationalStatusChanged { operational });
            }
            Ok(())
        })
    }

    pub fn authorize_caller(&self, ctx: &CallContext, caller: &Principal) -> SuretyResult<()> {
        self.transact(ctx, Guard::OwnerOperational, false, |state, _, events| {
            if state.access.authorize(caller) {
                info!("Caller {} authorized", caller);
                events.push(SuretyEvent::CallerAuthorized { caller: *caller });
            }
            Ok(())
        })
    }

    pub fn deauthorize_caller(&self, ctx: &CallContext, caller: &Principal) -> SuretyResult<()> {
        self.transact(ctx, Guard::OwnerOperational, false, |state, _, events| {
            if state.access.deauthorize(caller) {
                info!("Caller {} deauthorized", caller);
                events.push(SuretyEvent::CallerDeauthorized { caller: *caller });
            }
            Ok(())
        })
    }

    // ----- airlines -----

    pub fn register_airline(
        &self,
        ctx: &CallContext,
        candidate: &Principal,
        name: &str,
    ) -> SuretyResult<RegistrationOutcome> {
        self.transact(ctx, Guard::Operational, false, |state, tx, events| {
            state
                .admission
                .request_registration(&mut state.store, candidate, name, &tx.caller, events)
        })
    }

    /// Fund the calling airline with the attached value.
    pub fn fund_airline(&self, ctx: &CallContext) -> SuretyResult<FundingReceipt> {
        self.transact(ctx, Guard::Operational, true, |state, tx, events| {
            let receipt = state
                .admission
                .assess_funding(&state.store, &tx.caller, tx.value)?;
            state
                .admission
                .commit_funding(&mut state.store, &tx.caller, &receipt, events)?;
            if receipt.refund > 0 {
                if let Err(err) = tx.values.transfer(&tx.pool, &tx.caller, receipt.refund) {
                    state.store.revoke_funding(&tx.caller, receipt.contributed);
                    return Err(err);
                }
            }
            Ok(receipt)
        })
    }

    // ----- flights and insurance -----

    pub fn register_flight(
        &self,
        ctx: &CallContext,
        registration: FlightRegistration,
    ) -> SuretyResult<FlightKey> {
        self.transact(ctx, Guard::Operational, false, |state, tx, events| {
            state
                .insurance
                .register_flight(&mut state.store, tx.height, &tx.caller, registration, events)
        })
    }

    /// Insure the caller on `key` for the attached value.
    pub fn buy_insurance(&self, ctx: &CallContext, key: &FlightKey) -> SuretyResult<()> {
        self.transact(ctx, Guard::Operational, true, |state, tx, events| {
            state
                .insurance
                .buy_insurance(&mut state.store, key, &tx.caller, tx.value, events)
        })
    }

    /// Finalize a flight's status directly. Allow-listed callers only.
    pub fn apply_flight_status(
        &self,
        ctx: &CallContext,
        key: &FlightKey,
        status: FlightStatus,
    ) -> SuretyResult<StatusOutcome> {
        self.transact(ctx, Guard::Authorized, false, |state, _, events| {
            state
                .insurance
                .apply_flight_status(&mut state.store, key, status, events)
        })
    }

    /// Pay the caller's whole credited balance out of the pool.
    pub fn withdraw(&self, ctx: &CallContext) -> SuretyResult<Amount> {
        self.transact(ctx, Guard::Operational, false, |state, tx, events| {
            let available = tx.values.balance_of(&tx.pool);
            let amount = state
                .insurance
                .begin_withdrawal(&mut state.store, &tx.caller, available)?;
            if let Err(err) = tx.values.transfer(&tx.pool, &tx.caller, amount) {
                state.store.restore_balance(&tx.caller, amount);
                return Err(err);
            }
            info!("Paid {} to insuree {}", amount, tx.caller);
            events.push(SuretyEvent::PaidInsuree {
                passenger: tx.caller,
                amount,
            });
            Ok(amount)
        })
    }

    /// Top up the pool with the attached value. Allow-listed callers only.
    pub fn fund_pool(&self, ctx: &CallContext) -> SuretyResult<Amount> {
        self.transact(ctx, Guard::Authorized, true, |_, tx, events| {
            if tx.value == 0 {
                return Err(SuretyError::InvalidAmount(String::from(
                    "pool funding requires attached value",
                )));
            }
            events.push(SuretyEvent::PoolFunded {
                from: tx.caller,
                amount: tx.value,
            });
            Ok(tx.value)
        })
    }

    // ----- oracles -----

    /// Register the caller as an oracle against the attached fee.
    pub fn register_oracle(&self, ctx: &CallContext) -> SuretyResult<[u8; INDEXES_PER_ORACLE]> {
        self.transact(ctx, Guard::Operational, true, |state, tx, events| {
            state.oracles.register_oracle(
                &mut state.store,
                tx.blocks,
                tx.height,
                &tx.caller,
                tx.value,
                events,
            )
        })
    }

    pub fn request_flight_status(
        &self,
        ctx: &CallContext,
        flight: &FlightRef,
    ) -> SuretyResult<OracleTicket> {
        self.transact(ctx, Guard::Operational, false, |state, tx, events| {
            state.oracles.request_status(
                &mut state.store,
                tx.blocks,
                tx.height,
                &tx.caller,
                flight,
                events,
            )
        })
    }

    pub fn submit_oracle_response(
        &self,
        ctx: &CallContext,
        index: u8,
        flight: &FlightRef,
        status: FlightStatus,
    ) -> SuretyResult<ResponseOutcome> {
        self.transact(ctx, Guard::Operational, false, |state, tx, events| {
            state.oracles.submit_response(
                &mut state.store,
                &state.insurance,
                tx.height,
                &tx.caller,
                index,
                flight,
                status,
                events,
            )
        })
    }

    // ----- reads -----

    pub fn is_operational(&self) -> bool {
        self.state.lock().access.is_operational()
    }

    pub fn owner(&self) -> Principal {
        *self.state.lock().access.owner()
    }

    pub fn is_authorized(&self, caller: &Principal) -> bool {
        self.state.lock().access.is_authorized(caller)
    }

    pub fn config(&self) -> SuretyConfig {
        self.state.lock().config.clone()
    }

    pub fn pool(&self) -> Principal {
        self.pool
    }

    pub fn pool_balance(&self) -> Amount {
        self.values.balance_of(&self.pool)
    }

    pub fn height(&self) -> u64 {
        self.blocks.height()
    }

    pub fn airline(&self, airline: &Principal) -> Airline {
        self.state.lock().store.airline(airline)
    }

    pub fn is_airline_registered(&self, airline: &Principal) -> bool {
        self.state.lock().store.is_registered(airline)
    }

    pub fn is_airline_funded(&self, airline: &Principal) -> bool {
        self.state.lock().store.is_funded(airline)
    }

    pub fn registered_airline_count(&self) -> usize {
        self.state.lock().store.registered_count()
    }

    pub fn funded_airline_count(&self) -> usize {
        self.state.lock().store.funded_count()
    }

    /// Votes collected so far for a pending candidate
    pub fn ballot_votes(&self, candidate: &Principal) -> usize {
        self.state.lock().store.ballot_size(candidate)
    }

    pub fn flight(&self, key: &FlightKey) -> Option<Flight> {
        self.state.lock().store.flight(key).cloned()
    }

    pub fn is_flight_landed(&self, key: &FlightKey) -> SuretyResult<bool> {
        self.state
            .lock()
            .store
            .flight(key)
            .map(Flight::is_landed)
            .ok_or(SuretyError::FlightNotFound)
    }

    pub fn flights_of(&self, airline: &Principal) -> Vec<(FlightKey, Flight)> {
        self.state
            .lock()
            .store
            .flights_of(airline)
            .map(|(key, flight)| (*key, flight.clone()))
            .collect()
    }

    pub fn claim(&self, key: &FlightKey, passenger: &Principal) -> Option<InsuranceClaim> {
        self.state.lock().store.claim(key, passenger).cloned()
    }

    pub fn claims(&self, key: &FlightKey) -> Vec<InsuranceClaim> {
        self.state.lock().store.claims(key).to_vec()
    }

    pub fn withdrawable_balance(&self, passenger: &Principal) -> Amount {
        self.state.lock().store.balance(passenger)
    }

    pub fn oracle_indexes(&self, oracle: &Principal) -> SuretyResult<[u8; INDEXES_PER_ORACLE]> {
        self.state
            .lock()
            .store
            .oracle(oracle)
            .map(|registration| registration.indexes)
            .ok_or(SuretyError::OracleNotRegistered)
    }

    pub fn request(&self, key: &RequestKey) -> Option<ResponseInfo> {
        self.state.lock().store.request(key).cloned()
    }

    pub fn snapshot(&self) -> SuretySnapshot {
        let state = self.state.lock();
        let store = &state.store;
        SuretySnapshot {
            operational: state.access.is_operational(),
            owner: *state.access.owner(),
            authorized: state.access.authorized_callers().copied().collect(),
            pool: self.pool,
            pool_balance: self.values.balance_of(&self.pool),
            registered_airlines: store.registered_count(),
            funded_airlines: store.funded_count(),
            flights: store.flight_count(),
            landed_flights: store.flights().filter(|(_, f)| f.is_landed()).count(),
            oracles: store.oracle_count(),
            open_requests: store.open_request_count(),
            total_withdrawable: store.total_withdrawable(),
            profile: state.config.profile(),
        }
    }
}

#[cfg(test)]
mod tests;
