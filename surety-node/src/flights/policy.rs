use serde::{Deserialize, Serialize};

use surety_common::{
    flight::FlightKey,
    utils::{AccountId, Amount},
};

/// A passenger's cover on one flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurancePolicy {
    pub passenger: AccountId,
    pub flight: FlightKey,
    pub premium: Amount,
    pub payout: Amount,
    /// Flips false -> true at most once.
    pub claimed: bool,
}

impl InsurancePolicy {
    /// Part of the payout not covered by the premium, reserved from airline bonds.
    pub fn top_up(&self) -> Amount {
        self.payout.saturating_sub(self.premium)
    }
}

/// Proof that a policy was marked claimed.
///
/// Only [`FlightRegistry::begin_claim`](super::FlightRegistry::begin_claim) creates one,
/// and it does so after setting `claimed`, so a payout can never be settled for a policy
/// that is still claimable.
#[derive(Debug, PartialEq, Eq)]
pub struct ClaimTicket {
    policy: InsurancePolicy,
}

impl ClaimTicket {
    pub(super) fn new(policy: InsurancePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &InsurancePolicy {
        &self.policy
    }
}
