//! Flight & Insurance Registry.

pub mod flight;
pub mod policy;
pub mod registry;

pub use flight::{Flight, FlightInfo};
pub use policy::{ClaimTicket, InsurancePolicy};
pub use registry::FlightRegistry;
