//! In-process stand-ins for the external collaborators: a bootstrap step, the
//! frontend calls of the two reference scenarios, and oracle workers that watch for
//! request notifications and answer when their index matches.

use std::time::Duration;

use rand::Rng;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle, time::timeout};
use tracing::{debug, info, warn};

use surety_bank::escrow::EscrowSnapshot;
use surety_common::{
    airline::AirlineStatus,
    config::SuretyConfig,
    crypto::flight_index,
    error::{Result, SuretyError},
    events::SuretyEvent,
    flight::{FlightKey, FlightStatus},
    utils::{AccountId, Amount, UNIT},
};

use crate::runtime::SuretyHandle;

const RESOLUTION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OracleWorker {
    pub id: AccountId,
    pub indexes: [u8; 3],
    /// Status this worker reports for every request it is eligible for.
    pub answer: FlightStatus,
}

/// Spawns one task per worker. Each subscribes before returning, so no request
/// opened after this call is missed.
pub fn spawn_oracle_workers(handle: &SuretyHandle, workers: Vec<OracleWorker>) -> Vec<JoinHandle<()>> {
    workers
        .into_iter()
        .map(|worker| {
            let mut events = handle.subscribe();
            let handle = handle.clone();
            tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(SuretyEvent::OracleRequest {
                            request_id,
                            airline,
                            flight,
                            timestamp,
                            index,
                        }) if worker.indexes.contains(&index) => {
                            // Off-chain workers answer with some latency.
                            let delay = rand::thread_rng().gen_range(1..=20u64);
                            tokio::time::sleep(Duration::from_millis(delay)).await;

                            let key = FlightKey::new(airline, flight, timestamp);
                            match handle.submit_response(&worker.id, &key, worker.answer).await {
                                Ok(resolution) => debug!(
                                    "🔮 {} answered request #{}: {:?}",
                                    worker.id, request_id, resolution
                                ),
                                Err(e) => debug!("🔮 {} answer to #{} rejected: {}", worker.id, request_id, e),
                            }
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("⚠️ Oracle worker {} lagged, {} notifications skipped", worker.id, skipped);
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            })
        })
        .collect()
}

/// Funds the first airline and binds the app module, if not done yet.
pub async fn bootstrap(handle: &SuretyHandle, config: &SuretyConfig) -> Result<()> {
    let first = &config.first_airline;
    if handle.airline_status(first).await? == AirlineStatus::Registered {
        handle.fund(first, config.airline_registration_fee).await?;
    }
    if !handle.query(|app| app.is_authorized(&app.config().app_module)).await? {
        handle.authorize_caller(first, &config.app_module).await?;
    }
    info!("🏗️ Bootstrap done: {} active, module {} bound", first, config.app_module);
    Ok(())
}

/// Five airlines join in order; the fifth needs votes from two ACTIVE members.
pub async fn run_scenario_a(handle: &SuretyHandle, config: &SuretyConfig) -> Result<Vec<(AccountId, AirlineStatus)>> {
    bootstrap(handle, config).await?;

    let mut airlines = vec![config.first_airline.clone()];
    for i in 1..5 {
        airlines.push(AccountId::from(format!("0xairline{}", i)));
    }

    for candidate in &airlines[1..4] {
        handle.register_airline(&airlines[0], candidate).await?;
        handle.fund(candidate, config.airline_registration_fee).await?;
    }

    let first_vote = handle.register_airline(&airlines[1], &airlines[4]).await?;
    info!("🗳️ {} after first vote: {:?}", airlines[4], first_vote);
    let second_vote = handle.register_airline(&airlines[2], &airlines[4]).await?;
    info!("🗳️ {} after second vote: {:?}", airlines[4], second_vote);

    let mut statuses = Vec::new();
    for airline in airlines {
        let status = handle.airline_status(&airline).await?;
        statuses.push((airline, status));
    }
    Ok(statuses)
}

#[derive(Debug)]
pub struct ScenarioReport {
    pub flight: FlightKey,
    pub status: FlightStatus,
    pub premium: Amount,
    pub payout: Amount,
    pub second_claim: Option<SuretyError>,
    pub escrow: EscrowSnapshot,
}

/// A passenger insures a flight, oracle workers report it late through the airline's
/// fault, and the passenger claims once.
///
/// `eligible_oracles` workers hold the flight's index; three of them report
/// LATE_AIRLINE and the rest ON_TIME.
pub async fn run_scenario_b(
    handle: &SuretyHandle,
    config: &SuretyConfig,
    eligible_oracles: usize,
) -> Result<ScenarioReport> {
    bootstrap(handle, config).await?;

    let airline = config.first_airline.clone();
    let passenger = AccountId::from("0xpassenger");
    let timestamp = chrono::Utc::now().timestamp().max(0) as u64;
    let flight = handle.register_flight(&airline, "ND1309", timestamp).await?;

    let premium = UNIT / 5;
    let policy = handle.buy_insurance(&passenger, &flight, premium).await?;

    let target = flight_index(&flight, config.oracle_index_range);
    let mut workers = Vec::new();
    let mut eligible = 0;
    let mut i = 0;
    while eligible < eligible_oracles {
        let id = AccountId::from(format!("0xoracle{}", i));
        i += 1;
        let indexes = handle.register_oracle(&id, config.oracle_registration_fee).await?;
        let answer = if indexes.contains(&target) {
            eligible += 1;
            if eligible <= config.min_responses {
                FlightStatus::LateAirline
            } else {
                FlightStatus::OnTime
            }
        } else {
            FlightStatus::LateOther
        };
        workers.push(OracleWorker { id, indexes, answer });
    }
    info!(
        "🔮 {} oracles registered, {} hold index {}",
        workers.len(),
        eligible,
        target
    );

    let mut events = handle.subscribe();
    let tasks = spawn_oracle_workers(handle, workers);

    let ticket = handle.fetch_flight_status(&passenger, &flight).await?;
    let status = timeout(RESOLUTION_TIMEOUT, async {
        loop {
            match events.recv().await {
                Ok(SuretyEvent::FlightStatusResolved {
                    request_id,
                    status_code,
                    ..
                }) if request_id == ticket.request_id => return Ok(status_code),
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return Err(SuretyError::Runtime("Event stream closed".into())),
            }
        }
    })
    .await
    .map_err(|_| SuretyError::Runtime(format!("Request #{} did not resolve", ticket.request_id)))??;

    for task in tasks {
        task.abort();
    }

    let payout = handle.pay_benefit(&passenger, &flight).await?;
    let second_claim = handle.pay_benefit(&passenger, &flight).await.err();
    let escrow = handle.escrow_snapshot().await?;

    Ok(ScenarioReport {
        flight,
        status,
        premium: policy.premium,
        payout,
        second_claim,
        escrow,
    })
}
