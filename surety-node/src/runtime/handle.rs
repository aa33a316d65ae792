use tokio::sync::{broadcast, mpsc, oneshot};

use surety_bank::{escrow::EscrowSnapshot, membership::Admission};
use surety_common::{
    airline::AirlineStatus,
    error::{Result, SuretyError},
    events::SuretyEvent,
    flight::{FlightKey, FlightStatus},
    utils::{AccountId, Amount},
};
use surety_consensus::{RequestTicket, Resolution};

use crate::{
    app::{FeeSchedule, FlightSurety},
    flights::{FlightInfo, InsurancePolicy},
};

use super::{
    command::{Command, Outcome},
    journal::Journal,
    sequencer::{Envelope, Receipt},
};

/// Client side of the sequencer. Cheap to clone; the sequencer stops when every
/// handle is dropped.
#[derive(Debug, Clone)]
pub struct SuretyHandle {
    tx: mpsc::Sender<Envelope>,
    events: broadcast::Sender<SuretyEvent>,
}

fn closed() -> SuretyError {
    SuretyError::Runtime("Sequencer is not running".into())
}

fn unexpected(outcome: Outcome) -> SuretyError {
    SuretyError::Runtime(format!("Unexpected outcome: {:?}", outcome))
}

impl SuretyHandle {
    pub(crate) fn new(tx: mpsc::Sender<Envelope>, events: broadcast::Sender<SuretyEvent>) -> Self {
        Self { tx, events }
    }

    /// Notifications of every command committed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SuretyEvent> {
        self.events.subscribe()
    }

    /// Queues a command and waits for its result.
    pub async fn submit(&self, command: Command) -> Result<Receipt> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope::Execute { command, reply })
            .await
            .map_err(|_| closed())?;
        rx.await.map_err(|_| closed())?
    }

    /// Runs a read-only closure on the state, ordered with the commands.
    pub async fn query<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&FlightSurety) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let inspect = Box::new(move |app: &FlightSurety| {
            let _ = reply.send(f(app));
        });
        self.tx
            .send(Envelope::Inspect(inspect))
            .await
            .map_err(|_| closed())?;
        rx.await.map_err(|_| closed())
    }

    pub async fn journal(&self) -> Result<Journal> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope::Journal(reply))
            .await
            .map_err(|_| closed())?;
        rx.await.map_err(|_| closed())
    }

    // --- Commands -------------------------------------------------------------------

    async fn submit_done(&self, command: Command) -> Result<()> {
        match self.submit(command).await?.outcome {
            Outcome::Done => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub async fn set_operating_status(&self, caller: &AccountId, operational: bool) -> Result<()> {
        self.submit_done(Command::SetOperatingStatus {
            caller: caller.clone(),
            operational,
        })
        .await
    }

    pub async fn authorize_caller(&self, caller: &AccountId, module: &AccountId) -> Result<()> {
        self.submit_done(Command::AuthorizeCaller {
            caller: caller.clone(),
            module: module.clone(),
        })
        .await
    }

    pub async fn register_airline(&self, caller: &AccountId, candidate: &AccountId) -> Result<Admission> {
        let command = Command::RegisterAirline {
            caller: caller.clone(),
            candidate: candidate.clone(),
        };
        match self.submit(command).await?.outcome {
            Outcome::Admission(admission) => Ok(admission),
            other => Err(unexpected(other)),
        }
    }

    pub async fn fund(&self, caller: &AccountId, amount: Amount) -> Result<()> {
        self.submit_done(Command::Fund {
            caller: caller.clone(),
            amount,
        })
        .await
    }

    pub async fn override_airline_status(
        &self,
        caller: &AccountId,
        airline: &AccountId,
        status: AirlineStatus,
    ) -> Result<AirlineStatus> {
        let command = Command::OverrideAirlineStatus {
            caller: caller.clone(),
            airline: airline.clone(),
            status,
        };
        match self.submit(command).await?.outcome {
            Outcome::PreviousStatus(previous) => Ok(previous),
            other => Err(unexpected(other)),
        }
    }

    pub async fn register_flight(&self, caller: &AccountId, code: &str, timestamp: u64) -> Result<FlightKey> {
        let command = Command::RegisterFlight {
            caller: caller.clone(),
            code: code.to_string(),
            timestamp,
        };
        match self.submit(command).await?.outcome {
            Outcome::Flight(key) => Ok(key),
            other => Err(unexpected(other)),
        }
    }

    pub async fn buy_insurance(
        &self,
        caller: &AccountId,
        flight: &FlightKey,
        premium: Amount,
    ) -> Result<InsurancePolicy> {
        let command = Command::BuyInsurance {
            caller: caller.clone(),
            airline: flight.airline.clone(),
            code: flight.code.clone(),
            timestamp: flight.timestamp,
            premium,
        };
        match self.submit(command).await?.outcome {
            Outcome::Policy(policy) => Ok(policy),
            other => Err(unexpected(other)),
        }
    }

    pub async fn pay_benefit(&self, caller: &AccountId, flight: &FlightKey) -> Result<Amount> {
        let command = Command::PayBenefit {
            caller: caller.clone(),
            airline: flight.airline.clone(),
            code: flight.code.clone(),
            timestamp: flight.timestamp,
        };
        match self.submit(command).await?.outcome {
            Outcome::Paid(amount) => Ok(amount),
            other => Err(unexpected(other)),
        }
    }

    pub async fn register_oracle(&self, caller: &AccountId, fee: Amount) -> Result<[u8; 3]> {
        let command = Command::RegisterOracle {
            caller: caller.clone(),
            fee,
        };
        match self.submit(command).await?.outcome {
            Outcome::Indexes(indexes) => Ok(indexes),
            other => Err(unexpected(other)),
        }
    }

    pub async fn fetch_flight_status(&self, caller: &AccountId, flight: &FlightKey) -> Result<RequestTicket> {
        let command = Command::FetchFlightStatus {
            caller: caller.clone(),
            airline: flight.airline.clone(),
            code: flight.code.clone(),
            timestamp: flight.timestamp,
        };
        match self.submit(command).await?.outcome {
            Outcome::Request(ticket) => Ok(ticket),
            other => Err(unexpected(other)),
        }
    }

    pub async fn submit_response(
        &self,
        caller: &AccountId,
        flight: &FlightKey,
        status: FlightStatus,
    ) -> Result<Resolution> {
        let command = Command::SubmitResponse {
            caller: caller.clone(),
            airline: flight.airline.clone(),
            code: flight.code.clone(),
            timestamp: flight.timestamp,
            status,
        };
        match self.submit(command).await?.outcome {
            Outcome::Response(resolution) => Ok(resolution),
            other => Err(unexpected(other)),
        }
    }

    // --- Queries --------------------------------------------------------------------

    pub async fn is_operational(&self) -> Result<bool> {
        self.query(|app| app.is_operational()).await
    }

    pub async fn airline_status(&self, id: &AccountId) -> Result<AirlineStatus> {
        let id = id.clone();
        self.query(move |app| app.airline_status(&id)).await
    }

    pub async fn active_airline_count(&self) -> Result<usize> {
        self.query(|app| app.active_airline_count()).await
    }

    pub async fn flight_info(&self, flight: &FlightKey) -> Result<FlightInfo> {
        let key = flight.clone();
        self.query(move |app| app.flight_info(&key.airline, &key.code, key.timestamp))
            .await
    }

    pub async fn check_package(&self, passenger: &AccountId, flight: &FlightKey) -> Result<Option<InsurancePolicy>> {
        let (passenger, key) = (passenger.clone(), flight.clone());
        self.query(move |app| {
            app.check_package(&passenger, &key.airline, &key.code, key.timestamp)
                .cloned()
        })
        .await
    }

    pub async fn indexes_of(&self, caller: &AccountId) -> Result<[u8; 3]> {
        let caller = caller.clone();
        self.query(move |app| app.indexes_of(&caller)).await?
    }

    pub async fn escrow_snapshot(&self) -> Result<EscrowSnapshot> {
        self.query(|app| app.escrow_snapshot()).await
    }

    pub async fn paid_to(&self, recipient: &AccountId) -> Result<Amount> {
        let recipient = recipient.clone();
        self.query(move |app| app.paid_to(&recipient)).await
    }

    pub async fn fees(&self) -> Result<FeeSchedule> {
        self.query(|app| app.fees()).await
    }

    pub async fn state_digest(&self) -> Result<String> {
        self.query(|app| app.state_digest()).await?
    }
}
