use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use surety_common::{airline::AirlineStatus, utils::AccountId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub id: AccountId,
    pub status: AirlineStatus,
    /// Distinct ACTIVE airlines that voted for admission while PENDING.
    pub votes: BTreeSet<AccountId>,
}

impl Airline {
    pub fn new(id: AccountId, status: AirlineStatus) -> Self {
        Self {
            id,
            status,
            votes: BTreeSet::new(),
        }
    }
}
