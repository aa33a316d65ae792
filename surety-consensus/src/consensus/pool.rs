use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use surety_common::flight::{FlightKey, FlightStatus};

use super::registry::ResponseTally;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    Open,
    /// Terminal.
    Resolved(FlightStatus),
}

/// One flight-status query and the responses collected for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub request_id: u64,
    pub key: FlightKey,
    /// Only oracles holding this index may respond.
    pub index: u8,
    pub tally: ResponseTally,
    pub state: RequestState,
}

impl StatusRequest {
    pub fn is_open(&self) -> bool {
        self.state == RequestState::Open
    }

    pub fn resolved_status(&self) -> Option<FlightStatus> {
        match self.state {
            RequestState::Resolved(status) => Some(status),
            RequestState::Open => None,
        }
    }
}

/// Status requests by id, with a lookup by flight key.
#[derive(Debug, Default, Clone)]
pub struct RequestPool {
    requests: BTreeMap<u64, StatusRequest>,
    by_key: HashMap<FlightKey, u64>,
    last_id: u64,
}

impl RequestPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new request for `key` and returns its id.
    pub fn open(&mut self, key: FlightKey, index: u8) -> u64 {
        self.last_id += 1;
        let request_id = self.last_id;
        self.by_key.insert(key.clone(), request_id);
        self.requests.insert(
            request_id,
            StatusRequest {
                request_id,
                key,
                index,
                tally: ResponseTally::new(),
                state: RequestState::Open,
            },
        );
        request_id
    }

    pub fn find_by_id(&self, request_id: u64) -> Option<&StatusRequest> {
        self.requests.get(&request_id)
    }

    pub fn find_by_key(&self, key: &FlightKey) -> Option<&StatusRequest> {
        self.by_key.get(key).and_then(|id| self.requests.get(id))
    }

    pub(crate) fn find_by_key_mut(&mut self, key: &FlightKey) -> Option<&mut StatusRequest> {
        match self.by_key.get(key) {
            Some(id) => self.requests.get_mut(id),
            None => None,
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &StatusRequest> {
        self.requests.values()
    }

    pub fn open_count(&self) -> usize {
        self.requests.values().filter(|r| r.is_open()).count()
    }
}
