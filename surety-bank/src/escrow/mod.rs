//! Escrow Ledger: custody of funds in logically separated pools.

pub mod ledger;
pub mod pools;

pub use ledger::{EscrowEntry, EscrowLedger, EscrowSnapshot, Movement};
pub use pools::EscrowPool;
