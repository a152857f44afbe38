use super::*;
use crate::chain::{BlockSource, SimulatedChain, SuretyEvent};
use crate::config::{InsuranceConfig, OracleConfig};
use crate::errors::SuretyError;
use crate::insurance::{FlightRegistration, InsuranceEngine};
use crate::ledger::{FlightKey, FlightRef, FlightStatus, LedgerStore, Principal, UNIT};

pub mod index_tests;

pub const DEPARTURE: u64 = 1_700_000_000;

pub fn chain() -> SimulatedChain {
    SimulatedChain::at_height("oracle-tests", 1_000)
}

pub fn airline() -> Principal {
    Principal::from_label("airline")
}

pub fn passenger() -> Principal {
    Principal::from_label("passenger")
}

pub fn flight() -> FlightRef {
    FlightRef::new(airline(), "ND1309", DEPARTURE)
}

pub fn consensus(min_responses: usize) -> OracleConsensus {
    OracleConsensus::new(OracleConfig {
        min_responses,
        ..OracleConfig::default()
    })
}

pub fn insurance() -> InsuranceEngine {
    InsuranceEngine::new(InsuranceConfig::default())
}

/// Store with a funded airline, its flight, and one insured passenger
pub fn store_with_flight(insurance: &InsuranceEngine) -> (LedgerStore, FlightKey) {
    let mut store = LedgerStore::new();
    store.register_airline(&airline()).unwrap();
    store.mark_funded(&airline(), 10 * UNIT).unwrap();
    let mut events = Vec::new();
    let key = insurance
        .register_flight(
            &mut store,
            900,
            &airline(),
            FlightRegistration::new("ND1309", DEPARTURE, "AMS", "JFK"),
            &mut events,
        )
        .unwrap();
    insurance
        .buy_insurance(&mut store, &key, &passenger(), UNIT, &mut events)
        .unwrap();
    (store, key)
}

/// Register fresh oracles until `count` of them hold `index`.
pub fn oracles_holding(
    consensus: &mut OracleConsensus,
    store: &mut LedgerStore,
    chain: &SimulatedChain,
    index: u8,
    count: usize,
) -> Vec<Principal> {
    let mut holders = Vec::new();
    for n in 0..500 {
        if holders.len() == count {
            break;
        }
        let oracle = Principal::from_label(&format!("oracle-{}-{}", index, n));
        let mut events = Vec::new();
        let indexes = consensus
            .register_oracle(store, chain, chain.height(), &oracle, UNIT, &mut events)
            .unwrap();
        if indexes.contains(&index) {
            holders.push(oracle);
        }
    }
    assert_eq!(holders.len(), count, "not enough oracles drew index {}", index);
    holders
}

/// Register a fresh oracle that does not hold `index`.
pub fn oracle_without(
    consensus: &mut OracleConsensus,
    store: &mut LedgerStore,
    chain: &SimulatedChain,
    index: u8,
) -> Principal {
    for n in 0..500 {
        let oracle = Principal::from_label(&format!("outsider-{}-{}", index, n));
        let mut events = Vec::new();
        let indexes = consensus
            .register_oracle(store, chain, chain.height(), &oracle, UNIT, &mut events)
            .unwrap();
        if !indexes.contains(&index) {
            return oracle;
        }
    }
    panic!("every oracle drew index {}", index);
}
