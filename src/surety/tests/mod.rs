use super::*;
use crate::chain::{InMemoryValueLedger, MockValueLedger, SimulatedChain};
use crate::ledger::UNIT;


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

pub fn test_config() -> SuretyConfig {
    let mut config = SuretyConfig::default();
    config.oracle.min_responses = 2;
    config
}

pub struct Harness {
    pub surety: FlightSurety,
    pub log: Arc<EventLog>,
    pub values: Arc<InMemoryValueLedger>,
    pub chain: Arc<SimulatedChain>,
}

impl Harness {
    pub fn new(config: SuretyConfig) -> Self {
        let log = Arc::new(EventLog::new());
        let values = Arc::new(InMemoryValueLedger::new());
        let chain = Arc::new(SimulatedChain::at_height("surety-tests", 1_000));
        let surety = FlightSurety::builder(owner())
            .config(config)
            .blocks(chain.clone())
            .values(values.clone())
            .events(log.clone())
            .build()
            .unwrap();
        Harness {
            surety,
            log,
            values,
            chain,
        }
    }

    pub fn mint(&self, account: &Principal, amount: Amount) {
        self.values.mint(account, amount);
    }

    /// Fund the owner's genesis airline with exactly the fee.
    pub fn fund_owner(&self) {
        let fee = self.surety.config().admission.registration_fee;
        self.mint(&owner(), fee);
        self.surety.fund_airline(&paying(owner(), fee)).unwrap();
    }

    pub fn register_flight(&self) -> FlightKey {
        self.surety
            .register_flight(
                &ctx(owner()),
                FlightRegistration::new("ND1309", DEPARTURE, "AMS", "JFK"),
            )
            .unwrap()
    }

    pub fn insure(&self, passenger: &Principal, key: &FlightKey, amount: Amount) {
        self.mint(passenger, amount);
        self.surety.buy_insurance(&paying(*passenger, amount), key).unwrap();
    }

    pub fn events(&self) -> Vec<SuretyEvent> {
        self.log.events()
    }
}

pub fn harness() -> Harness {
    Harness::new(test_config())
}

/// Facade over a mocked value ledger
pub fn mocked(values: MockValueLedger, config: SuretyConfig) -> (FlightSurety, Arc<EventLog>) {
    let log = Arc::new(EventLog::new());
    let surety = FlightSurety::builder(owner())
        .config(config)
        .blocks(Arc::new(SimulatedChain::at_height("surety-mocks", 1_000)))
        .values(Arc::new(values))
        .events(log.clone())
        .build()
        .unwrap();
    (surety, log)
}
