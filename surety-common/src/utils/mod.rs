//! Common types and helpers shared across the surety crates.

pub mod account_id;
pub use account_id::AccountId;

pub mod amount;
pub use amount::{as_units, format_units, parse_units, Amount, PayoutMultiplier, UNIT};
