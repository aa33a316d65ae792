use serde::{Deserialize, Serialize};

use surety_common::{
    flight::{FlightKey, FlightStatus},
    utils::Amount,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub key: FlightKey,
    pub status: FlightStatus,
    /// Set once, when oracle consensus writes the status.
    pub resolved: bool,
    /// Premiums collected on this flight.
    pub total_insured: Amount,
    /// The resolved status entitles policy holders to a payout.
    pub paying: bool,
}

impl Flight {
    pub fn new(key: FlightKey) -> Self {
        Self {
            key,
            status: FlightStatus::Unknown,
            resolved: false,
            total_insured: 0,
            paying: false,
        }
    }
}

/// Read-only view returned by `flight_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightInfo {
    pub registered: bool,
    pub status: FlightStatus,
    pub resolved: bool,
    pub paying: bool,
    pub total_insured: Amount,
}

impl From<&Flight> for FlightInfo {
    fn from(f: &Flight) -> Self {
        Self {
            registered: true,
            status: f.status,
            resolved: f.resolved,
            paying: f.paying,
            total_insured: f.total_insured,
        }
    }
}

impl FlightInfo {
    pub fn unregistered() -> Self {
        Self {
            registered: false,
            status: FlightStatus::Unknown,
            resolved: false,
            paying: false,
            total_insured: 0,
        }
    }
}
