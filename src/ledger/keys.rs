use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::types::Principal;

/// Canonical key of a flight record: `H(airline || flight || timestamp)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlightKey(pub [u8; 32]);

/// Key of an oracle request: `H(index || airline || flight || timestamp)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestKey(pub [u8; 32]);

// Timestamps are packed as 32-byte big-endian words so keys match the
// packed encoding used by the ledger's clients.
fn timestamp_word(timestamp: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&timestamp.to_be_bytes());
    word
}

fn finish(hasher: Sha256) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

impl FlightKey {
    pub fn derive(airline: &Principal, flight_number: &str, timestamp: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(airline.as_bytes());
        hasher.update(flight_number.as_bytes());
        hasher.update(timestamp_word(timestamp));
        FlightKey(finish(hasher))
    }
}

impl RequestKey {
    pub fn derive(index: u8, airline: &Principal, flight_number: &str, timestamp: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([index]);
        hasher.update(airline.as_bytes());
        hasher.update(flight_number.as_bytes());
        hasher.update(timestamp_word(timestamp));
        RequestKey(finish(hasher))
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlightKey(0x{})", hex::encode(&self.0[..6]))
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestKey(0x{})", hex::encode(&self.0[..6]))
    }
}
