use super::*;

#[test]
fn test_unknown_airline_is_zero_valued() {
    let store = LedgerStore::new();
    let airline = store.airline(&Principal::from_label("nobody"));
    assert_eq!(airline, Airline::default());
    assert_eq!(store.registered_count(), 0);
}

#[test]
fn test_register_airline_counts_once() {
    let mut store = LedgerStore::new();
    let a = Principal::from_label("a");

    store.register_airline(&a).unwrap();
    assert_eq!(store.register_airline(&a), Err(SuretyError::AlreadyRegistered));
    assert_eq!(store.registered_count(), 1);
}

#[test]
fn test_registration_consumes_ballot() {
    let mut store = LedgerStore::new();
    let candidate = Principal::from_label("candidate");
    let voter = Principal::from_label("voter");

    assert_eq!(store.record_vote(&candidate, &voter), Ok(1));
    assert_eq!(store.record_vote(&candidate, &voter), Err(SuretyError::DuplicateVote));

    store.register_airline(&candidate).unwrap();
    assert!(store.ballot(&candidate).is_none());
}

#[test]
fn test_funding_requires_registration() {
    let mut store = LedgerStore::new();
    let a = Principal::from_label("a");

    assert_eq!(store.mark_funded(&a, UNIT), Err(SuretyError::NotRegistered));
    store.register_airline(&a).unwrap();
    store.mark_funded(&a, UNIT).unwrap();
    assert_eq!(store.mark_funded(&a, UNIT), Err(SuretyError::AlreadyFunded));

    assert_eq!(store.funded_count(), 1);
    assert_eq!(store.airline(&a).contributed, UNIT);
}

#[test]
fn test_revoke_funding_undoes_mark() {
    let mut store = LedgerStore::new();
    let a = Principal::from_label("a");
    store.register_airline(&a).unwrap();
    store.mark_funded(&a, UNIT).unwrap();

    store.revoke_funding(&a, UNIT);
    assert!(!store.is_funded(&a));
    assert!(store.is_registered(&a));
    assert_eq!(store.funded_count(), 0);
    assert_eq!(store.airline(&a).contributed, 0);

    // Revoking an unfunded airline is a no-op
    store.revoke_funding(&a, UNIT);
    assert_eq!(store.funded_count(), 0);
}

#[test]
fn test_flight_requires_funded_airline() {
    let mut store = LedgerStore::new();
    let a = Principal::from_label("a");
    store.register_airline(&a).unwrap();

    let result = store.insert_flight(test_flight(&a, "ND1309", 100));
    assert_eq!(result, Err(SuretyError::NotFunded));
    assert_eq!(store.flight_count(), 0);
}

#[test]
fn test_duplicate_flight_rejected() {
    let a = Principal::from_label("a");
    let mut store = funded_store(&a);

    let key = store.insert_flight(test_flight(&a, "ND1309", 100)).unwrap();
    assert_eq!(key, FlightKey::derive(&a, "ND1309", 100));
    assert_eq!(
        store.insert_flight(test_flight(&a, "ND1309", 100)),
        Err(SuretyError::FlightAlreadyRegistered)
    );
}

#[test]
fn test_landed_flight_is_immutable() {
    let a = Principal::from_label("a");
    let mut store = funded_store(&a);
    let key = store.insert_flight(test_flight(&a, "ND1309", 100)).unwrap();

    assert_eq!(store.set_flight_status(&key, FlightStatus::OnTime), Ok(true));
    assert_eq!(store.set_flight_status(&key, FlightStatus::LateAirline), Ok(false));
    assert_eq!(store.flight(&key).unwrap().status, FlightStatus::OnTime);
}

#[test]
fn test_one_claim_per_passenger_per_flight() {
    let a = Principal::from_label("a");
    let p = Principal::from_label("p");
    let mut store = funded_store(&a);
    let key = store.insert_flight(test_flight(&a, "ND1309", 100)).unwrap();

    store.insert_claim(&key, claim(&p, UNIT)).unwrap();
    assert_eq!(store.insert_claim(&key, claim(&p, UNIT)), Err(SuretyError::DuplicateInsurance));
    assert_eq!(store.claims(&key).len(), 1);
}

#[test]
fn test_credit_claims_is_exactly_once() {
    let a = Principal::from_label("a");
    let p1 = Principal::from_label("p1");
    let p2 = Principal::from_label("p2");
    let mut store = funded_store(&a);
    let key = store.insert_flight(test_flight(&a, "ND1309", 100)).unwrap();
    store.insert_claim(&key, claim(&p1, UNIT)).unwrap();
    store.insert_claim(&key, claim(&p2, UNIT / 3)).unwrap();

    let credited = store.credit_claims(&key);
    assert_eq!(credited, vec![(p1, 1_500_000_000), (p2, 499_999_999)]);
    assert!(store.credit_claims(&key).is_empty());
    assert_eq!(store.balance(&p1), 1_500_000_000);
    assert_eq!(store.total_withdrawable(), 1_999_999_999);
}

#[test]
fn test_take_balance_zeroes() {
    let a = Principal::from_label("a");
    let p = Principal::from_label("p");
    let mut store = funded_store(&a);
    let key = store.insert_flight(test_flight(&a, "ND1309", 100)).unwrap();
    store.insert_claim(&key, claim(&p, UNIT)).unwrap();
    store.credit_claims(&key);

    assert_eq!(store.take_balance(&p), Ok(1_500_000_000));
    assert_eq!(store.balance(&p), 0);
    assert_eq!(store.take_balance(&p), Err(SuretyError::NoWithdrawableBalance));

    store.restore_balance(&p, 7);
    assert_eq!(store.balance(&p), 7);
}

#[test]
fn test_flights_of_filters_by_airline() {
    let a = Principal::from_label("a");
    let b = Principal::from_label("b");
    let mut store = funded_store(&a);
    store.register_airline(&b).unwrap();
    store.mark_funded(&b, UNIT).unwrap();

    store.insert_flight(test_flight(&a, "A1", 1)).unwrap();
    store.insert_flight(test_flight(&a, "A2", 1)).unwrap();
    store.insert_flight(test_flight(&b, "B1", 1)).unwrap();

    assert_eq!(store.flights_of(&a).count(), 2);
    assert_eq!(store.flights_of(&b).count(), 1);
}
