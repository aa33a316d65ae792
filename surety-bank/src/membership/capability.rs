//! Typed results of role checks.
//!
//! A token can only be obtained from [`AirlineRegistry`](super::registry::AirlineRegistry)
//! after the corresponding status check passed, so operations that take a token
//! cannot be reached by a caller lacking the role.

use surety_common::utils::AccountId;

/// The airline was ACTIVE when checked; may vote and register flights or airlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveAirline(AccountId);

/// The airline was REGISTERED (admitted, not yet funded) when checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAirline(AccountId);

impl ActiveAirline {
    pub(crate) fn new(id: AccountId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> &AccountId {
        &self.0
    }
}

impl RegisteredAirline {
    pub(crate) fn new(id: AccountId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> &AccountId {
        &self.0
    }
}
