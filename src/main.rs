use flightsurety_core::chain::{EventLog, InMemoryValueLedger, SimulatedChain};
use flightsurety_core::oracle::{OracleFleet, StatusStrategy};
use flightsurety_core::{
    CallContext, FlightRef, FlightRegistration, FlightStatus, FlightSurety, Principal, SuretyConfig,
    SuretyEvent, UNIT,
};
use log::{error, info, warn};
use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Path of an optional TOML configuration file
const CONFIG_ENV: &str = "FLIGHTSURETY_CONFIG";

const FLEET_SIZE: usize = 20;

fn load_config() -> SuretyConfig {
    let path = env::var_os(CONFIG_ENV).map(PathBuf::from);
    match SuretyConfig::load(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    }
}

fn run(config: SuretyConfig) -> Result<(), Box<dyn Error>> {
    let owner = Principal::from_label("owner");
    let passengers: Vec<Principal> = (0..3)
        .map(|n| Principal::from_label(&format!("passenger-{}", n)))
        .collect();
    let airline_fee = config.admission.registration_fee;
    let oracle_fee = config.oracle.registration_fee;

    let chain = Arc::new(SimulatedChain::at_height("flightsurety-sim", 1_000));
    let values = Arc::new(InMemoryValueLedger::new());
    let log = Arc::new(EventLog::new());
    let surety = FlightSurety::builder(owner)
        .first_airline(owner, "Sim Air")
        .config(config)
        .blocks(chain.clone())
        .values(values.clone())
        .events(log.clone())
        .build()?;

    values.mint(&owner, airline_fee);
    surety.fund_airline(&CallContext::with_value(owner, airline_fee))?;

    let mut fleet = OracleFleet::new(StatusStrategy::Fixed(FlightStatus::LateAirline));
    for n in 0..FLEET_SIZE {
        values.mint(&Principal::from_label(&format!("oracle-{}", n)), oracle_fee);
    }
    fleet.enroll_many(&surety, "oracle", FLEET_SIZE, oracle_fee)?;
    chain.mine();

    let departure = 1_700_000_000;
    let key = surety.register_flight(
        &CallContext::new(owner),
        FlightRegistration::new("SIM101", departure, "AMS", "JFK"),
    )?;
    for passenger in &passengers {
        values.mint(passenger, UNIT);
        surety.buy_insurance(&CallContext::with_value(*passenger, UNIT), &key)?;
    }
    chain.mine();

    let flight = FlightRef::new(owner, "SIM101", departure);
    let ticket = surety.request_flight_status(&CallContext::new(passengers[0]), &flight)?;
    info!("Requested status of {} at index {}", flight.flight_number, ticket.index);

    let reports = fleet.poll(&surety, &log);
    let rejected = reports.iter().filter(|r| r.result.is_err()).count();
    info!("{} oracle reports sent, {} rejected", reports.len(), rejected);
    if !surety.is_flight_landed(&key)? {
        warn!("Too few oracles hold index {}; flight still unresolved", ticket.index);
    }

    for passenger in &passengers {
        match surety.withdraw(&CallContext::new(*passenger)) {
            Ok(amount) => info!("{} withdrew {}", passenger, amount),
            Err(e) => warn!("{} could not withdraw: {}", passenger, e),
        }
    }

    let paid = log
        .events()
        .iter()
        .filter(|e| matches!(e, SuretyEvent::PaidInsuree { .. }))
        .count();
    info!("{} events recorded, {} payouts", log.len(), paid);
    match serde_json::to_string_pretty(&surety.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Could not render snapshot: {}", e),
    }
    Ok(())
}

fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    info!("Starting FlightSurety simulation...");
    let config = load_config();
    if let Err(e) = run(config) {
        error!("Simulation failed: {}", e);
        process::exit(1);
    }
    info!("FlightSurety simulation finished");
}
