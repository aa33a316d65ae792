mod common;

use common::*;
use surety_bank::{escrow::EscrowPool, membership::Admission};
use surety_common::{airline::AirlineStatus, error::ErrorKind, utils::UNIT};
use surety_node::{simulation::run_scenario_a, Sequencer};

#[tokio::test]
async fn test_auto_admission_below_four_active() {
    let handle = setup().await;

    for active in 1..=3 {
        let candidate = airline(active);
        let admission = handle.register_airline(&first_airline(), &candidate).await.unwrap();
        assert_eq!(admission, Admission::Registered { votes: 0 });
        assert_eq!(handle.airline_status(&candidate).await.unwrap(), AirlineStatus::Registered);

        handle.fund(&candidate, 10 * UNIT).await.unwrap();
        assert_eq!(handle.active_airline_count().await.unwrap(), active + 1);
    }
}

#[tokio::test]
async fn test_quorum_counts_distinct_voters() {
    let handle = setup().await;
    with_active_airlines(&handle, 4).await;
    let candidate = airline(9);

    let first = handle.register_airline(&airline(1), &candidate).await.unwrap();
    assert_eq!(first, Admission::Pending { votes: 1, required: 2 });

    for _ in 0..3 {
        let again = handle.register_airline(&airline(1), &candidate).await.unwrap();
        assert_eq!(again, Admission::Pending { votes: 1, required: 2 });
    }
    assert_eq!(handle.airline_status(&candidate).await.unwrap(), AirlineStatus::Pending);

    let second = handle.register_airline(&airline(2), &candidate).await.unwrap();
    assert_eq!(second, Admission::Registered { votes: 2 });
    assert_eq!(handle.airline_status(&candidate).await.unwrap(), AirlineStatus::Registered);
}

#[tokio::test]
async fn test_only_active_airlines_vote() {
    let handle = setup().await;
    with_active_airlines(&handle, 4).await;

    handle.register_airline(&airline(1), &airline(5)).await.unwrap();
    let err = handle
        .register_airline(&airline(5), &airline(6))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    let err = handle
        .register_airline(&"0xstranger".into(), &airline(6))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(handle.airline_status(&airline(6)).await.unwrap(), AirlineStatus::Unregistered);
}

#[tokio::test]
async fn test_fund_activates_exactly_once() {
    let handle = setup().await;
    handle.register_airline(&first_airline(), &airline(1)).await.unwrap();

    let err = handle.fund(&airline(1), 5 * UNIT).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    assert_eq!(handle.airline_status(&airline(1)).await.unwrap(), AirlineStatus::Registered);

    handle.fund(&airline(1), 10 * UNIT).await.unwrap();
    let bonds = handle.escrow_snapshot().await.unwrap().balance(EscrowPool::AirlineBonds);
    assert_eq!(bonds, 20 * UNIT);

    let err = handle.fund(&airline(1), 10 * UNIT).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
    assert_eq!(handle.airline_status(&airline(1)).await.unwrap(), AirlineStatus::Active);
    let snapshot = handle.escrow_snapshot().await.unwrap();
    assert_eq!(snapshot.balance(EscrowPool::AirlineBonds), 20 * UNIT);
    assert!(snapshot.is_balanced());
}

#[tokio::test]
async fn test_unregistered_airline_cannot_fund() {
    let handle = setup().await;
    let err = handle.fund(&airline(7), 10 * UNIT).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[tokio::test]
async fn test_scenario_a_five_airlines() {
    let config = config();
    let handle = Sequencer::spawn(config.clone()).unwrap();

    let statuses = run_scenario_a(&handle, &config).await.unwrap();
    let expected = [
        AirlineStatus::Active,
        AirlineStatus::Active,
        AirlineStatus::Active,
        AirlineStatus::Active,
        AirlineStatus::Registered,
    ];
    for (i, (id, status)) in statuses.iter().enumerate() {
        assert_eq!(id, &airline(i));
        assert_eq!(*status, expected[i]);
    }
}

#[tokio::test]
async fn test_admin_override_moves_backwards() {
    let handle = setup().await;
    with_active_airlines(&handle, 2).await;

    let previous = handle
        .override_airline_status(&admin(), &airline(1), AirlineStatus::Registered)
        .await
        .unwrap();
    assert_eq!(previous, AirlineStatus::Active);
    assert_eq!(handle.active_airline_count().await.unwrap(), 1);

    let err = handle
        .register_flight(&airline(1), "ND1", 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}
