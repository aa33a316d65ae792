//! Oracle consensus: status requests, response tallies and the threshold evaluator.
//!
//! A request opened for a flight is answered by oracles holding its eligibility
//! index. Votes are tallied per status code; the first code to collect the configured
//! number of distinct votes resolves the request.

mod engine;
pub mod evaluator;
pub mod pool;
pub mod registry;

pub use engine::{OracleConsensusEngine, RequestTicket, Resolution};
