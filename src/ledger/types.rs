use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::keys::{FlightKey, RequestKey};

/// Value in base units. One whole unit is [`UNIT`] base units.
pub type Amount = u64;

/// Base units per whole value unit
pub const UNIT: Amount = 1_000_000_000;

/// Opaque identity of a caller: airline, passenger, oracle or owner.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Principal(pub [u8; 20]);

impl Principal {
    pub const ZERO: Principal = Principal([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Principal(bytes)
    }

    /// Derive a stable principal from a human-readable label.
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Principal(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable
        write!(f, "Principal(0x{})", hex::encode(&self.0[..4]))
    }
}

/// Flight status codes as reported by oracles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlightStatus {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    /// Wire code used by oracle clients
    pub fn code(self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        FlightStatus::ALL.iter().copied().find(|s| s.code() == code)
    }

    /// Delays the airline is liable for. Only these trigger crediting.
    pub fn is_airline_fault(self) -> bool {
        matches!(self, FlightStatus::LateAirline | FlightStatus::LateTechnical)
    }

    pub fn is_final(self) -> bool {
        self != FlightStatus::Unknown
    }
}

impl Default for FlightStatus {
    fn default() -> Self {
        FlightStatus::Unknown
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightStatus::Unknown => write!(f, "Unknown"),
            FlightStatus::OnTime => write!(f, "OnTime"),
            FlightStatus::LateAirline => write!(f, "LateAirline"),
            FlightStatus::LateWeather => write!(f, "LateWeather"),
            FlightStatus::LateTechnical => write!(f, "LateTechnical"),
            FlightStatus::LateOther => write!(f, "LateOther"),
        }
    }
}

/// Membership record of an airline. Created zero-valued on first reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    /// Display name given when registration was requested
    pub name: String,
    pub registered: bool,
    pub funded: bool,
    /// Total value paid in through funding
    pub contributed: Amount,
}

/// Quorum ballot for a candidate airline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub voters: BTreeSet<Principal>,
}

/// A registered flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub airline: Principal,
    pub flight_number: String,
    /// Scheduled departure timestamp supplied by the airline
    pub timestamp: u64,
    pub departure: String,
    pub arrival: String,
    pub status: FlightStatus,
    /// Height at which the flight was registered
    pub registered_at: u64,
}

impl Flight {
    /// A flight is landed once its status is anything but `Unknown`.
    pub fn is_landed(&self) -> bool {
        self.status.is_final()
    }
}

/// Public coordinates of a flight as oracles see it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightRef {
    pub airline: Principal,
    pub flight_number: String,
    pub timestamp: u64,
}

impl FlightRef {
    pub fn new(airline: Principal, flight_number: &str, timestamp: u64) -> Self {
        FlightRef {
            airline,
            flight_number: flight_number.to_string(),
            timestamp,
        }
    }

    pub fn key(&self) -> FlightKey {
        FlightKey::derive(&self.airline, &self.flight_number, self.timestamp)
    }

    pub fn request_key(&self, index: u8) -> RequestKey {
        RequestKey::derive(index, &self.airline, &self.flight_number, self.timestamp)
    }
}

impl From<&Flight> for FlightRef {
    fn from(flight: &Flight) -> Self {
        FlightRef::new(flight.airline, &flight.flight_number, flight.timestamp)
    }
}

/// One passenger's cover on one flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceClaim {
    pub passenger: Principal,
    pub purchase_price: Amount,
    /// Payout multiplier scaled by 100 (150 = 1.5x)
    pub payout_percentage: u32,
    pub credited: bool,
}

impl InsuranceClaim {
    /// `purchase_price * payout_percentage / 100`, truncated.
    ///
    /// Validated configurations keep this within `Amount` for every
    /// purchase up to the insurance cap.
    pub fn payout(&self) -> Amount {
        let scaled = u128::from(self.purchase_price) * u128::from(self.payout_percentage) / 100;
        Amount::try_from(scaled).unwrap_or(Amount::MAX)
    }
}

/// Index slots assigned to an oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRegistration {
    pub indexes: [u8; 3],
    pub registered_at: u64,
}

impl OracleRegistration {
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Book-keeping for one oracle request key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    pub requester: Principal,
    pub index: u8,
    pub flight: FlightRef,
    pub opened_at: u64,
    pub open: bool,
    /// Reporting oracles per status, in arrival order
    pub responses: BTreeMap<FlightStatus, Vec<Principal>>,
    /// Status that reached quorum, once resolved
    pub resolution: Option<FlightStatus>,
}

impl ResponseInfo {
    pub fn response_count(&self, status: FlightStatus) -> usize {
        self.responses.get(&status).map_or(0, Vec::len)
    }

    pub fn has_reported(&self, oracle: &Principal, status: FlightStatus) -> bool {
        self.responses
            .get(&status)
            .map_or(false, |oracles| oracles.contains(oracle))
    }
}
