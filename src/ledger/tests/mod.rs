use super::*;

pub mod store_tests;

/// Store with one registered, funded airline
pub fn funded_store(airline: &Principal) -> LedgerStore {
    let mut store = LedgerStore::new();
    store.register_airline(airline).unwrap();
    store.mark_funded(airline, 10 * UNIT).unwrap();
    store
}

pub fn test_flight(airline: &Principal, number: &str, timestamp: u64) -> Flight {
    Flight {
        airline: *airline,
        flight_number: number.to_string(),
        timestamp,
        departure: "AMS".to_string(),
        arrival: "JFK".to_string(),
        status: FlightStatus::Unknown,
        registered_at: 1,
    }
}

pub fn claim(passenger: &Principal, price: Amount) -> InsuranceClaim {
    InsuranceClaim {
        passenger: *passenger,
        purchase_price: price,
        payout_percentage: 150,
        credited: false,
    }
}
