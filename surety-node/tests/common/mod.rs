#![allow(dead_code)]

use surety_common::{
    config::SuretyConfig,
    crypto::flight_index,
    flight::FlightKey,
    utils::{AccountId, UNIT},
};
use surety_node::{simulation::bootstrap, Sequencer, SuretyHandle};

pub fn config() -> SuretyConfig {
    SuretyConfig::default()
}

pub fn first_airline() -> AccountId {
    config().first_airline
}

pub fn admin() -> AccountId {
    config().admin
}

pub fn airline(i: usize) -> AccountId {
    AccountId::from(format!("0xairline{}", i))
}

/// Sequencer with the first airline ACTIVE and the app module bound.
pub async fn setup() -> SuretyHandle {
    let config = config();
    let handle = Sequencer::spawn(config.clone()).unwrap();
    bootstrap(&handle, &config).await.unwrap();
    handle
}

/// Brings the number of ACTIVE airlines to `n` (first airline included) through the
/// bootstrap admission path.
pub async fn with_active_airlines(handle: &SuretyHandle, n: usize) {
    for i in 1..n {
        handle.register_airline(&first_airline(), &airline(i)).await.unwrap();
        handle.fund(&airline(i), 10 * UNIT).await.unwrap();
    }
    assert_eq!(handle.active_airline_count().await.unwrap(), n);
}

pub async fn registered_flight(handle: &SuretyHandle, code: &str) -> FlightKey {
    handle.register_flight(&first_airline(), code, 1_700_000_000).await.unwrap()
}

/// Registers oracles until `n` of them can answer requests on `flight`.
/// Returns (eligible, ineligible).
pub async fn oracles_for(handle: &SuretyHandle, flight: &FlightKey, n: usize) -> (Vec<AccountId>, Vec<AccountId>) {
    let target = flight_index(flight, config().oracle_index_range);
    let mut eligible = Vec::new();
    let mut ineligible = Vec::new();
    let mut i = 0;
    while eligible.len() < n {
        let id = AccountId::from(format!("0xoracle{}", i));
        let indexes = handle.register_oracle(&id, UNIT).await.unwrap();
        if indexes.contains(&target) {
            eligible.push(id);
        } else {
            ineligible.push(id);
        }
        i += 1;
    }
    (eligible, ineligible)
}
