pub mod app;
pub mod cli;
pub mod flights;
pub mod runtime;
pub mod simulation;
pub mod switch;

pub use app::FlightSurety;
pub use runtime::{Command, Sequencer, SuretyHandle};
