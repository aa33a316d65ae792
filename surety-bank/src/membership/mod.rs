//! Membership Registry & Quorum Voting.

pub mod airline;
pub mod capability;
pub mod registry;

pub use airline::Airline;
pub use capability::{ActiveAirline, RegisteredAirline};
pub use registry::{Admission, AdmissionPolicy, AirlineRegistry};
