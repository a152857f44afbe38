use super::*;
use crate::ledger::UNIT;


pub fn airline() -> Principal {
    Principal::from_label("airline")
}

pub fn passenger(n: usize) -> Principal {
    Principal::from_label(&format!("passenger-{}", n))
}

pub fn engine() -> InsuranceEngine {
    InsuranceEngine::new(InsuranceConfig::default())
}

/// Store with a funded airline and one registered flight
pub fn store_with_flight(engine: &InsuranceEngine) -> (LedgerStore, FlightKey) {
    let mut store = LedgerStore::new();
    store.register_airline(&airline()).unwrap();
    store.mark_funded(&airline(), 10 * UNIT).unwrap();
    let mut events = Vec::new();
    let key = engine
        .register_flight(
            &mut store,
            5,
            &airline(),
            FlightRegistration::new("ND1309", 1_700_000_000, "AMS", "JFK"),
            &mut events,
        )
        .unwrap();
    (store, key)
}
