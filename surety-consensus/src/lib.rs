pub mod consensus;
pub mod oracle;

pub use consensus::evaluator::ThresholdPolicy;
pub use consensus::pool::{RequestState, StatusRequest};
pub use consensus::{OracleConsensusEngine, RequestTicket, Resolution};
pub use oracle::{Oracle, OracleRegistry};
