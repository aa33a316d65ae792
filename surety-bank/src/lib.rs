//! Custody and membership: the escrow ledger holding bonds, premiums and the payout
//! reserve, and the airline registry with its quorum admission rules.

pub mod escrow;
pub mod membership;

mod tests;

pub use escrow::{EscrowLedger, EscrowPool, EscrowSnapshot};
pub use membership::{ActiveAirline, Admission, AdmissionPolicy, AirlineRegistry, RegisteredAirline};
