//! Notifications observed by external collaborators.
//!
//! `OracleRequest` and `FlightStatusResolved` are the two interoperability shapes
//! consumed by oracle workers and the frontend; their field sets must not change.
//! On the wire each notification is `{"<VariantName>": {<camelCase fields>}}`, so the
//! inner object is exactly `{requestId, airline, flight, timestamp, index}` and
//! `{requestId, statusCode, flight, timestamp, verified}`.

use serde::{Deserialize, Serialize};

use crate::{
    airline::AirlineStatus,
    flight::FlightStatus,
    utils::{AccountId, Amount},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all_fields = "camelCase")]
pub enum SuretyEvent {
    /// A status request was opened; only oracles holding `index` may answer it.
    OracleRequest {
        request_id: u64,
        airline: AccountId,
        flight: String,
        timestamp: u64,
        index: u8,
    },
    /// A status code reached the response threshold and was written to the flight.
    FlightStatusResolved {
        request_id: u64,
        status_code: FlightStatus,
        flight: String,
        timestamp: u64,
        verified: bool,
    },
    AirlineStatusChanged {
        airline: AccountId,
        status: AirlineStatus,
        votes: usize,
    },
    OracleRegistered {
        oracle: AccountId,
        indexes: [u8; 3],
    },
    InsurancePurchased {
        passenger: AccountId,
        airline: AccountId,
        flight: String,
        timestamp: u64,
        premium: Amount,
        payout: Amount,
    },
    BenefitPaid {
        passenger: AccountId,
        airline: AccountId,
        flight: String,
        timestamp: u64,
        amount: Amount,
    },
    OperationalStatusChanged {
        operational: bool,
    },
    CallerAuthorized {
        module: AccountId,
        by: AccountId,
    },
}

impl SuretyEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SuretyEvent::OracleRequest { .. } => "ORACLE_REQUEST",
            SuretyEvent::FlightStatusResolved { .. } => "FLIGHT_STATUS_RESOLVED",
            SuretyEvent::AirlineStatusChanged { .. } => "AIRLINE_STATUS_CHANGED",
            SuretyEvent::OracleRegistered { .. } => "ORACLE_REGISTERED",
            SuretyEvent::InsurancePurchased { .. } => "INSURANCE_PURCHASED",
            SuretyEvent::BenefitPaid { .. } => "BENEFIT_PAID",
            SuretyEvent::OperationalStatusChanged { .. } => "OPERATIONAL_STATUS_CHANGED",
            SuretyEvent::CallerAuthorized { .. } => "CALLER_AUTHORIZED",
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
