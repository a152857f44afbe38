use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::index::IndexGenerator;
use super::INDEXES_PER_ORACLE;
use crate::chain::{BlockSource, SuretyEvent};
use crate::config::OracleConfig;
use crate::errors::{SuretyError, SuretyResult};
use crate::insurance::InsuranceEngine;
use crate::ledger::{
    Amount, FlightRef, FlightStatus, LedgerStore, OracleRegistration, Principal, RequestKey,
    ResponseInfo,
};

/// Handle for an opened status request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleTicket {
    pub index: u8,
    pub key: RequestKey,
    /// False when the key had already been resolved and stays closed
    pub open: bool,
}

/// Effect of one accepted oracle report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseOutcome {
    /// Reports now recorded for the reported status
    pub responses: usize,
    /// Set when this report completed the quorum
    pub resolution: Option<FlightStatus>,
    /// Passengers credited as a consequence
    pub credited: Vec<(Principal, Amount)>,
}

#[derive(Debug, Clone)]
pub struct OracleConsensus {
    config: OracleConfig,
    indexes: IndexGenerator,
}

impl OracleConsensus {
    pub fn new(config: OracleConfig) -> Self {
        OracleConsensus {
            config,
            indexes: IndexGenerator::new(),
        }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    pub fn nonce(&self) -> u64 {
        self.indexes.nonce()
    }

    pub fn register_oracle(
        &mut self,
        store: &mut LedgerStore,
        blocks: &dyn BlockSource,
        height: u64,
        oracle: &Principal,
        fee: Amount,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<[u8; INDEXES_PER_ORACLE]> {
        if fee < self.config.registration_fee {
            return Err(SuretyError::InsufficientFee {
                required: self.config.registration_fee,
                offered: fee,
            });
        }
        if !self.config.allow_reregistration && store.oracle(oracle).is_some() {
            return Err(SuretyError::OracleAlreadyRegistered);
        }

        // Draw on a copy so a failed derivation leaves the nonce untouched
        let mut generator = self.indexes.clone();
        let indexes = generator.generate_indexes(blocks, height, oracle)?;
        self.indexes = generator;

        if store.oracle(oracle).is_some() {
            debug!("Oracle {} re-registered, previous indexes replaced", oracle);
        }
        store.put_oracle(
            oracle,
            OracleRegistration {
                indexes,
                registered_at: height,
            },
        );
        info!("Oracle {} registered with indexes {:?}", oracle, indexes);
        events.push(SuretyEvent::OracleRegistered {
            oracle: *oracle,
            indexes,
        });
        Ok(indexes)
    }

    /// Open a status request for a registered flight under a freshly drawn index.
    pub fn request_status(
        &mut self,
        store: &mut LedgerStore,
        blocks: &dyn BlockSource,
        height: u64,
        requester: &Principal,
        flight: &FlightRef,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<OracleTicket> {
        if store.flight(&flight.key()).is_none() {
            return Err(SuretyError::FlightNotFound);
        }

        let index = self.indexes.draw(blocks, height, requester);
        let key = flight.request_key(index);

        let open = match store.request_mut(&key) {
            Some(existing) if !existing.open => {
                debug!("Request {} already resolved, not reopening", key);
                false
            }
            Some(existing) => {
                existing.requester = *requester;
                existing.opened_at = height;
                true
            }
            None => {
                store.put_request(
                    key,
                    ResponseInfo {
                        requester: *requester,
                        index,
                        flight: flight.clone(),
                        opened_at: height,
                        open: true,
                        responses: BTreeMap::new(),
                        resolution: None,
                    },
                );
                true
            }
        };

        debug!("Status request {} for {} at index {}", key, flight.flight_number, index);
        events.push(SuretyEvent::OracleRequest {
            index,
            airline: flight.airline,
            flight_number: flight.flight_number.clone(),
            timestamp: flight.timestamp,
        });
        Ok(OracleTicket { index, key, open })
    }

    /// Record an oracle's report. The report that first brings one status to
    /// `min_responses` resolves the request and applies the status.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_response(
        &self,
        store: &mut LedgerStore,
        insurance: &InsuranceEngine,
        height: u64,
        oracle: &Principal,
        index: u8,
        flight: &FlightRef,
        status: FlightStatus,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<ResponseOutcome> {
        let registration = store.oracle(oracle).ok_or(SuretyError::OracleNotRegistered)?;
        if !registration.holds(index) {
            return Err(SuretyError::IndexMismatch);
        }

        let key = flight.request_key(index);
        let request = match store.request(&key) {
            Some(request) if request.open => request,
            _ => return Err(SuretyError::RequestNotOpen),
        };
        if let Some(ttl) = self.config.request_ttl_blocks {
            let expires = request.opened_at.saturating_add(ttl);
            if height > expires {
                return Err(SuretyError::RequestExpired { expired_at: expires });
            }
        }
        if self.config.strict_dedup && request.has_reported(oracle, status) {
            return Err(SuretyError::DuplicateResponse);
        }
        let flight_key = flight.key();
        if store.flight(&flight_key).is_none() {
            return Err(SuretyError::FlightNotFound);
        }

        let min_responses = self.config.min_responses;
        let request = store.request_mut(&key).ok_or(SuretyError::RequestNotOpen)?;
        let reporters = request.responses.entry(status).or_default();
        reporters.push(*oracle);
        let responses = reporters.len();
        events.push(SuretyEvent::OracleReport {
            airline: flight.airline,
            flight_number: flight.flight_number.clone(),
            timestamp: flight.timestamp,
            status,
        });

        if responses < min_responses {
            debug!("Report {} for {}: {}/{}", status, key, responses, min_responses);
            return Ok(ResponseOutcome {
                responses,
                resolution: None,
                credited: Vec::new(),
            });
        }

        request.open = false;
        request.resolution = Some(status);
        info!(
            "Oracles agreed on {} for flight {} ({} reports)",
            status, flight.flight_number, responses
        );
        events.push(SuretyEvent::FlightStatusInfo {
            airline: flight.airline,
            flight_number: flight.flight_number.clone(),
            timestamp: flight.timestamp,
            status,
        });

        let applied = insurance.apply_flight_status(store, &flight_key, status, events)?;
        Ok(ResponseOutcome {
            responses,
            resolution: Some(status),
            credited: applied.credited,
        })
    }
}
