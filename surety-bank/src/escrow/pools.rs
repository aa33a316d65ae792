use serde::{Deserialize, Serialize};
use std::fmt;

/// Logically separated balance buckets of the shared custody ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowPool {
    /// Registration bonds paid by airlines; underwrites the payout top-up.
    AirlineBonds,
    /// Premiums collected from passengers.
    Premiums,
    /// Funds set aside for claims that have not been paid yet.
    PayoutReserve,
}

impl EscrowPool {
    pub const ALL: [EscrowPool; 3] = [
        EscrowPool::AirlineBonds,
        EscrowPool::Premiums,
        EscrowPool::PayoutReserve,
    ];
}

impl fmt::Display for EscrowPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscrowPool::AirlineBonds => write!(f, "airline_bonds"),
            EscrowPool::Premiums => write!(f, "premiums"),
            EscrowPool::PayoutReserve => write!(f, "payout_reserve"),
        }
    }
}
