mod common;

use common::*;
use surety_common::{error::ErrorKind, flight::FlightStatus, utils::UNIT};
use surety_node::runtime::{replay, JobStatus, Journal};

async fn busy_handle() -> surety_node::SuretyHandle {
    let handle = setup().await;
    with_active_airlines(&handle, 2).await;
    let flight = registered_flight(&handle, "ND1309").await;
    handle.buy_insurance(&"0xpax".into(), &flight, UNIT / 5).await.unwrap();
    // Rejected: over the cap.
    let _ = handle.buy_insurance(&"0xpax2".into(), &flight, 2 * UNIT).await;

    let (oracles, _) = oracles_for(&handle, &flight, 3).await;
    handle.fetch_flight_status(&"0xpax".into(), &flight).await.unwrap();
    for o in &oracles {
        handle.submit_response(o, &flight, FlightStatus::LateAirline).await.unwrap();
    }
    handle.pay_benefit(&"0xpax".into(), &flight).await.unwrap();
    // Rejected: already claimed.
    let _ = handle.pay_benefit(&"0xpax".into(), &flight).await;
    handle
}

#[tokio::test]
async fn test_replay_reproduces_live_state() {
    let handle = busy_handle().await;
    let journal = handle.journal().await.unwrap();
    assert!(journal.failed().count() >= 2);

    let rebuilt = replay(config(), &journal).unwrap();
    assert_eq!(
        rebuilt.state_digest().unwrap(),
        handle.state_digest().await.unwrap()
    );
}

#[tokio::test]
async fn test_tampered_journal_diverges() {
    let handle = busy_handle().await;
    let journal = handle.journal().await.unwrap();

    let mut entries = journal.entries().to_vec();
    let target = entries
        .iter_mut()
        .find(|e| e.status == JobStatus::Failed)
        .unwrap();
    target.status = JobStatus::Completed;
    target.err_msg = None;

    let err = replay(config(), &Journal::from_entries(entries)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Runtime);
}

#[tokio::test]
async fn test_journal_file_round_trip() {
    let handle = busy_handle().await;
    let journal = handle.journal().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.json");
    journal.save_to_file(&path).unwrap();
    let loaded = Journal::load_from_file(&path).unwrap();
    assert_eq!(loaded.len(), journal.len());

    let rebuilt = replay(config(), &loaded).unwrap();
    assert_eq!(
        rebuilt.state_digest().unwrap(),
        handle.state_digest().await.unwrap()
    );
}
