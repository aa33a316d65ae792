//! Single-writer runtime: a command queue consumed by one sequencer task.

pub mod command;
pub mod handle;
pub mod journal;
pub mod sequencer;

pub use command::{Command, Outcome};
pub use handle::SuretyHandle;
pub use journal::{JobStatus, Journal, JournalEntry};
pub use sequencer::{replay, Receipt, Sequencer};
