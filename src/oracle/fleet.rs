//! Off-ledger oracle fleet: enrolls a set of oracle accounts, watches the
//! event log for status requests and answers the ones matching their indexes.

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::INDEXES_PER_ORACLE;
use crate::chain::{EventLog, SuretyEvent};
use crate::errors::SuretyResult;
use crate::ledger::{Amount, FlightRef, FlightStatus, Principal};
use crate::surety::{CallContext, FlightSurety};

/// How fleet oracles decide which status to report
#[derive(Debug, Clone)]
pub enum StatusStrategy {
    /// Every oracle reports the same status
    Fixed(FlightStatus),
    /// Per-flight statuses, `Unknown` for anything not listed
    Scripted(BTreeMap<String, FlightStatus>),
    /// Each oracle draws independently
    Seeded(StdRng),
}

impl StatusStrategy {
    pub fn seeded(seed: u64) -> Self {
        StatusStrategy::Seeded(StdRng::seed_from_u64(seed))
    }

    pub fn status_for(&mut self, flight: &FlightRef) -> FlightStatus {
        match self {
            StatusStrategy::Fixed(status) => *status,
            StatusStrategy::Scripted(script) => script
                .get(&flight.flight_number)
                .copied()
                .unwrap_or_default(),
            StatusStrategy::Seeded(rng) => FlightStatus::ALL
                .choose(rng)
                .copied()
                .unwrap_or_default(),
        }
    }
}

/// One answer sent by the fleet
#[derive(Debug, Clone)]
pub struct FleetReport {
    pub oracle: Principal,
    pub index: u8,
    pub flight: FlightRef,
    pub status: FlightStatus,
    pub result: SuretyResult<Option<FlightStatus>>,
}

pub struct OracleFleet {
    oracles: Vec<(Principal, [u8; INDEXES_PER_ORACLE])>,
    strategy: StatusStrategy,
    cursor: u64,
}

impl OracleFleet {
    pub fn new(strategy: StatusStrategy) -> Self {
        OracleFleet {
            oracles: Vec::new(),
            strategy,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }

    pub fn oracles(&self) -> &[(Principal, [u8; INDEXES_PER_ORACLE])] {
        &self.oracles
    }

    pub fn set_strategy(&mut self, strategy: StatusStrategy) {
        self.strategy = strategy;
    }

    /// Register `oracle` on the ledger, paying `fee`, and add it to the fleet.
    pub fn enroll(
        &mut self,
        surety: &FlightSurety,
        oracle: Principal,
        fee: Amount,
    ) -> SuretyResult<[u8; INDEXES_PER_ORACLE]> {
        let indexes = surety.register_oracle(&CallContext::with_value(oracle, fee))?;
        self.oracles.retain(|(known, _)| known != &oracle);
        self.oracles.push((oracle, indexes));
        debug!("Fleet enrolled {} with indexes {:?}", oracle, indexes);
        Ok(indexes)
    }

    /// Enroll `count` oracles derived from `label`. Stops at the first failure.
    pub fn enroll_many(
        &mut self,
        surety: &FlightSurety,
        label: &str,
        count: usize,
        fee: Amount,
    ) -> SuretyResult<()> {
        for n in 0..count {
            let oracle = Principal::from_label(&format!("{}-{}", label, n));
            self.enroll(surety, oracle, fee)?;
        }
        info!("Fleet now has {} oracles", self.oracles.len());
        Ok(())
    }

    /// Answer every status request published since the last poll.
    ///
    /// Rejections are reported, not raised: once a request resolves, late
    /// oracles are expected to hit `RequestNotOpen`.
    pub fn poll(&mut self, surety: &FlightSurety, log: &EventLog) -> Vec<FleetReport> {
        let records = log.records_since(self.cursor);
        let mut reports = Vec::new();
        for record in records {
            self.cursor = record.sequence + 1;
            let SuretyEvent::OracleRequest {
                index,
                airline,
                flight_number,
                timestamp,
            } = record.event
            else {
                continue;
            };
            let flight = FlightRef::new(airline, &flight_number, timestamp);
            trace!("Fleet saw request for {} at index {}", flight_number, index);

            for (oracle, indexes) in &self.oracles {
                if !indexes.contains(&index) {
                    continue;
                }
                let status = self.strategy.status_for(&flight);
                let result = surety
                    .submit_oracle_response(&CallContext::new(*oracle), index, &flight, status)
                    .map(|outcome| outcome.resolution);
                reports.push(FleetReport {
                    oracle: *oracle,
                    index,
                    flight: flight.clone(),
                    status,
                    result,
                });
            }
        }
        reports
    }
}
