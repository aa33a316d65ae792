//! Shared vocabulary of the flight-surety core: identities, amounts, flight keys and
//! status codes, the error taxonomy, notifications and configuration.

pub mod airline;
pub mod config;
pub mod crypto;
pub mod error;
pub mod events;
pub mod flight;
pub mod utils;

pub use airline::AirlineStatus;
pub use config::SuretyConfig;
pub use error::{ErrorKind, Result, SuretyError};
pub use events::SuretyEvent;
pub use flight::{FlightKey, FlightStatus};
pub use utils::{AccountId, Amount};
