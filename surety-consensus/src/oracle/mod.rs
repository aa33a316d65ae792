pub mod registry;

pub use registry::{Oracle, OracleRegistry};
