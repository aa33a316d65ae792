mod common;

use common::*;
use surety_common::{
    airline::AirlineStatus,
    error::ErrorKind,
    flight::FlightStatus,
    utils::{AccountId, UNIT},
};

#[tokio::test]
async fn test_paused_system_rejects_every_mutation() {
    let handle = setup().await;
    with_active_airlines(&handle, 2).await;
    handle.register_airline(&first_airline(), &airline(2)).await.unwrap();
    let flight = registered_flight(&handle, "ND1309").await;
    let (oracles, _) = oracles_for(&handle, &flight, 1).await;
    handle.fetch_flight_status(&"0xpax".into(), &flight).await.unwrap();

    handle.set_operating_status(&admin(), false).await.unwrap();
    assert!(!handle.is_operational().await.unwrap());
    let before = handle.state_digest().await.unwrap();
    let pax = AccountId::from("0xpax");

    let results = vec![
        handle.authorize_caller(&first_airline(), &"0xmodule".into()).await.err(),
        handle.register_airline(&first_airline(), &airline(3)).await.err(),
        handle.fund(&airline(2), 10 * UNIT).await.err(),
        handle
            .override_airline_status(&admin(), &airline(1), AirlineStatus::Registered)
            .await
            .err(),
        handle.register_flight(&first_airline(), "ND1310", 1).await.err(),
        handle.buy_insurance(&pax, &flight, UNIT).await.err(),
        handle.pay_benefit(&pax, &flight).await.err(),
        handle.register_oracle(&"0xnew".into(), UNIT).await.err(),
        handle.fetch_flight_status(&pax, &flight).await.err(),
        handle
            .submit_response(&oracles[0], &flight, FlightStatus::OnTime)
            .await
            .err(),
    ];
    for (i, err) in results.into_iter().enumerate() {
        let err = err.unwrap_or_else(|| panic!("call {} succeeded while paused", i));
        assert_eq!(err.kind(), ErrorKind::Availability, "call {}", i);
    }

    assert_eq!(handle.state_digest().await.unwrap(), before);
}

#[tokio::test]
async fn test_toggle_rules() {
    let handle = setup().await;

    let err = handle.set_operating_status(&first_airline(), false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    let err = handle.set_operating_status(&admin(), true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    handle.set_operating_status(&admin(), false).await.unwrap();
    let err = handle.set_operating_status(&admin(), false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    handle.set_operating_status(&admin(), true).await.unwrap();
    assert!(handle.is_operational().await.unwrap());
    handle.register_airline(&first_airline(), &airline(1)).await.unwrap();
}
