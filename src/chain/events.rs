use log::trace;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::EventSink;
use crate::ledger::{Amount, FlightKey, FlightStatus, Principal};

/// Notifications emitted by successful operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SuretyEvent {
    OperationalStatusChanged {
        operational: bool,
    },
    CallerAuthorized {
        caller: Principal,
    },
    CallerDeauthorized {
        caller: Principal,
    },
    AirlineVoteRecorded {
        candidate: Principal,
        voter: Principal,
        votes: usize,
        required: usize,
    },
    AirlineRegistered {
        airline: Principal,
        name: String,
        votes: usize,
    },
    AirlineFunded {
        airline: Principal,
        amount: Amount,
    },
    FlightRegistered {
        key: FlightKey,
        airline: Principal,
        flight_number: String,
        timestamp: u64,
    },
    PassengerInsured {
        key: FlightKey,
        passenger: Principal,
        amount: Amount,
    },
    ProcessedFlightStatus {
        key: FlightKey,
        status: FlightStatus,
    },
    InsureeCredited {
        key: FlightKey,
        passenger: Principal,
        amount: Amount,
    },
    PaidInsuree {
        passenger: Principal,
        amount: Amount,
    },
    PoolFunded {
        from: Principal,
        amount: Amount,
    },
    OracleRegistered {
        oracle: Principal,
        indexes: [u8; 3],
    },
    OracleRequest {
        index: u8,
        airline: Principal,
        flight_number: String,
        timestamp: u64,
    },
    OracleReport {
        airline: Principal,
        flight_number: String,
        timestamp: u64,
        status: FlightStatus,
    },
    FlightStatusInfo {
        airline: Principal,
        flight_number: String,
        timestamp: u64,
        status: FlightStatus,
    },
}

/// An event stamped with its position in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub height: u64,
    pub event: SuretyEvent,
}

/// In-memory append-only event log that consumers poll with a cursor.
#[derive(Debug, Default)]
pub struct EventLog {
    records: RwLock<Vec<EventRecord>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Records with `sequence >= cursor`, in order.
    pub fn records_since(&self, cursor: u64) -> Vec<EventRecord> {
        let records = self.records.read();
        let start = usize::try_from(cursor).unwrap_or(usize::MAX).min(records.len());
        records[start..].to_vec()
    }

    pub fn events(&self) -> Vec<SuretyEvent> {
        self.records.read().iter().map(|r| r.event.clone()).collect()
    }

    /// Sequence number the next record will receive
    pub fn next_sequence(&self) -> u64 {
        self.records.read().len() as u64
    }
}

impl EventSink for EventLog {
    fn publish(&self, height: u64, events: Vec<SuretyEvent>) {
        let mut records = self.records.write();
        for event in events {
            let sequence = records.len() as u64;
            trace!("event #{} at height {}: {:?}", sequence, height, event);
            records.push(EventRecord {
                sequence,
                height,
                event,
            });
        }
    }
}
