use serde::{Deserialize, Serialize};

use surety_bank::membership::Admission;
use surety_common::{
    airline::AirlineStatus,
    error::Result,
    flight::{FlightKey, FlightStatus},
    utils::{as_units, AccountId, Amount},
};
use surety_consensus::{RequestTicket, Resolution};

use crate::{app::FlightSurety, flights::InsurancePolicy};

/// A state-changing call, as submitted to the sequencer and kept in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    SetOperatingStatus {
        caller: AccountId,
        operational: bool,
    },
    AuthorizeCaller {
        caller: AccountId,
        module: AccountId,
    },
    RegisterAirline {
        caller: AccountId,
        candidate: AccountId,
    },
    Fund {
        caller: AccountId,
        #[serde(with = "as_units")]
        amount: Amount,
    },
    OverrideAirlineStatus {
        caller: AccountId,
        airline: AccountId,
        status: AirlineStatus,
    },
    RegisterFlight {
        caller: AccountId,
        code: String,
        timestamp: u64,
    },
    BuyInsurance {
        caller: AccountId,
        airline: AccountId,
        code: String,
        timestamp: u64,
        #[serde(with = "as_units")]
        premium: Amount,
    },
    PayBenefit {
        caller: AccountId,
        airline: AccountId,
        code: String,
        timestamp: u64,
    },
    RegisterOracle {
        caller: AccountId,
        #[serde(with = "as_units")]
        fee: Amount,
    },
    FetchFlightStatus {
        caller: AccountId,
        airline: AccountId,
        code: String,
        timestamp: u64,
    },
    SubmitResponse {
        caller: AccountId,
        airline: AccountId,
        code: String,
        timestamp: u64,
        status: FlightStatus,
    },
}

/// What a successful command returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Admission(Admission),
    PreviousStatus(AirlineStatus),
    Flight(FlightKey),
    Policy(InsurancePolicy),
    Paid(Amount),
    Indexes([u8; 3]),
    Request(RequestTicket),
    Response(Resolution),
}

impl Command {
    pub fn caller(&self) -> &AccountId {
        match self {
            Command::SetOperatingStatus { caller, .. }
            | Command::AuthorizeCaller { caller, .. }
            | Command::RegisterAirline { caller, .. }
            | Command::Fund { caller, .. }
            | Command::OverrideAirlineStatus { caller, .. }
            | Command::RegisterFlight { caller, .. }
            | Command::BuyInsurance { caller, .. }
            | Command::PayBenefit { caller, .. }
            | Command::RegisterOracle { caller, .. }
            | Command::FetchFlightStatus { caller, .. }
            | Command::SubmitResponse { caller, .. } => caller,
        }
    }

    pub fn execute(&self, app: &mut FlightSurety) -> Result<Outcome> {
        match self {
            Command::SetOperatingStatus { caller, operational } => {
                app.set_operating_status(*operational, caller)?;
                Ok(Outcome::Done)
            }
            Command::AuthorizeCaller { caller, module } => {
                app.authorize_caller(module, caller)?;
                Ok(Outcome::Done)
            }
            Command::RegisterAirline { caller, candidate } => {
                app.register_airline(candidate, caller).map(Outcome::Admission)
            }
            Command::Fund { caller, amount } => {
                app.fund(*amount, caller)?;
                Ok(Outcome::Done)
            }
            Command::OverrideAirlineStatus { caller, airline, status } => app
                .override_airline_status(airline, *status, caller)
                .map(Outcome::PreviousStatus),
            Command::RegisterFlight { caller, code, timestamp } => {
                app.register_flight(code, *timestamp, caller).map(Outcome::Flight)
            }
            Command::BuyInsurance {
                caller,
                airline,
                code,
                timestamp,
                premium,
            } => app
                .buy_insurance(airline, code, *timestamp, *premium, caller)
                .map(Outcome::Policy),
            Command::PayBenefit {
                caller,
                airline,
                code,
                timestamp,
            } => app.pay_benefit(airline, code, *timestamp, caller).map(Outcome::Paid),
            Command::RegisterOracle { caller, fee } => app.register_oracle(*fee, caller).map(Outcome::Indexes),
            Command::FetchFlightStatus {
                caller,
                airline,
                code,
                timestamp,
            } => app
                .fetch_flight_status(airline, code, *timestamp, caller)
                .map(Outcome::Request),
            Command::SubmitResponse {
                caller,
                airline,
                code,
                timestamp,
                status,
            } => app
                .submit_response(airline, code, *timestamp, *status, caller)
                .map(Outcome::Response),
        }
    }
}
