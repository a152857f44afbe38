#![allow(dead_code)]

use flightsurety_core::chain::{EventLog, InMemoryValueLedger, SimulatedChain, ValueLedger};
use flightsurety_core::{
    Amount, CallContext, FlightKey, FlightRef, FlightRegistration, FlightSurety, Principal,
    SuretyConfig, SuretyEvent,
};
use std::sync::Arc;

pub const DEPARTURE: u64 = 1_700_000_000;

pub fn owner() -> Principal {
    Principal::from_label("owner")
}

pub fn airline(n: usize) -> Principal {
    Principal::from_label(&format!("airline-{}", n))
}

pub fn passenger(n: usize) -> Principal {
    Principal::from_label(&format!("passenger-{}", n))
}

pub fn ctx(caller: Principal) -> CallContext {
    CallContext::new(caller)
}

pub fn paying(caller: Principal, value: Amount) -> CallContext {
    CallContext::with_value(caller, value)
}

/// A deployed protocol on a simulated chain, with handles on every collaborator
pub struct TestNetwork {
    pub surety: FlightSurety,
    pub chain: Arc<SimulatedChain>,
    pub values: Arc<InMemoryValueLedger>,
    pub log: Arc<EventLog>,
    oracle_serial: std::cell::Cell<usize>,
}

impl TestNetwork {
    /// Deploy with `airline(1)` as the first airline.
    pub fn deploy(config: SuretyConfig) -> Self {
        let chain = Arc::new(SimulatedChain::at_height("integration", 1_000));
        let values = Arc::new(InMemoryValueLedger::new());
        let log = Arc::new(EventLog::new());
        let surety = FlightSurety::builder(owner())
            .first_airline(airline(1), "Airline 1")
            .config(config)
            .blocks(chain.clone())
            .values(values.clone())
            .events(log.clone())
            .build()
            .unwrap();
        TestNetwork {
            surety,
            chain,
            values,
            log,
            oracle_serial: std::cell::Cell::new(0),
        }
    }

    pub fn balance(&self, account: &Principal) -> Amount {
        self.values.balance_of(account)
    }

    pub fn fund(&self, airline: &Principal) {
        let fee = self.surety.config().admission.registration_fee;
        self.values.mint(airline, fee);
        self.surety.fund_airline(&paying(*airline, fee)).unwrap();
    }

    pub fn register_flight(&self, airline: &Principal, number: &str) -> (FlightKey, FlightRef) {
        let key = self
            .surety
            .register_flight(
                &ctx(*airline),
                FlightRegistration::new(number, DEPARTURE, "AMS", "JFK"),
            )
            .unwrap();
        (key, FlightRef::new(*airline, number, DEPARTURE))
    }

    pub fn insure(&self, passenger: &Principal, key: &FlightKey, amount: Amount) {
        self.values.mint(passenger, amount);
        self.surety
            .buy_insurance(&paying(*passenger, amount), key)
            .unwrap();
    }

    /// Register fresh oracles until `count` of them hold `index`.
    pub fn oracles_holding(&self, index: u8, count: usize) -> Vec<Principal> {
        let fee = self.surety.config().oracle.registration_fee;
        let mut holders = Vec::new();
        while holders.len() < count {
            let serial = self.oracle_serial.get();
            assert!(serial < 1_000, "not enough oracles drew index {}", index);
            self.oracle_serial.set(serial + 1);

            let oracle = Principal::from_label(&format!("oracle-{}", serial));
            self.values.mint(&oracle, fee);
            let indexes = self.surety.register_oracle(&paying(oracle, fee)).unwrap();
            if indexes.contains(&index) {
                holders.push(oracle);
            }
        }
        holders
    }

    pub fn count_events(&self, matches: impl Fn(&SuretyEvent) -> bool) -> usize {
        self.log.events().iter().filter(|e| matches(e)).count()
    }
}
