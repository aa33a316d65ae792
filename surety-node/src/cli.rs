use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "surety-node")]
#[command(about = "Flight insurance governance and settlement core")]
pub struct Cli {
    /// Tracing filter, overrides RUST_LOG and the config file
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a configuration file with default values
    InitConfig {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Run the airline admission and delayed-flight scenarios against an in-process sequencer
    Simulate {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Oracles holding the flight's index
        #[arg(long, default_value_t = 5)]
        oracles: usize,
        /// Write the command journal here when done
        #[arg(long, value_name = "OUT")]
        journal_out: Option<PathBuf>,
    },
    /// Re-execute a saved journal and print the resulting state digest
    Replay {
        #[arg(value_name = "FILE")]
        journal: PathBuf,
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}
