use super::*;
use crate::ledger::UNIT;


pub fn airline(n: usize) -> Principal {
    Principal::from_label(&format!("airline-{}", n))
}

pub fn controller() -> AdmissionController {
    AdmissionController::new(AdmissionConfig::default())
}

pub fn controller_with_policy(policy: FeePolicy) -> AdmissionController {
    let mut config = AdmissionConfig::default();
    config.fee_policy = policy;
    AdmissionController::new(config)
}

/// Store with airline 1 registered and funded
pub fn bootstrapped(admission: &AdmissionController) -> LedgerStore {
    let mut store = LedgerStore::new();
    store.register_airline(&airline(1)).unwrap();
    let mut events = Vec::new();
    admission.fund(&mut store, &airline(1), 10 * UNIT, &mut events).unwrap();
    store
}

/// Register and fund airlines 2..=n through the bootstrap path
pub fn grow_to(admission: &AdmissionController, store: &mut LedgerStore, n: usize) {
    let mut events = Vec::new();
    for i in 2..=n {
        admission
            .request_registration(store, &airline(i), &format!("Airline {}", i), &airline(1), &mut events)
            .unwrap();
        admission.fund(store, &airline(i), 10 * UNIT, &mut events).unwrap();
    }
}
