use std::path::Path;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

use surety_common::{config::SuretyConfig, utils::format_units};
use surety_node::{
    cli::{Cli, Commands},
    runtime::{replay, Journal, Sequencer},
    simulation::{run_scenario_a, run_scenario_b},
};

const DEFAULT_FILTER: &str = "info,surety_node=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    std::panic::set_hook(Box::new(|info| {
        let msg = match info.payload().downcast_ref::<&'static str>() {
            Some(s) => *s,
            None => match info.payload().downcast_ref::<String>() {
                Some(s) => &s[..],
                None => "Box<Any>",
            },
        };
        let location = match info.location() {
            Some(l) => format!("at {}:{}:{}", l.file(), l.line(), l.column()),
            None => "unknown location".to_string(),
        };
        eprintln!("CRASH: {} {}", msg, location);
    }));

    match cli.command {
        Commands::InitConfig { path } => {
            init_tracing(cli.log_filter.as_deref());
            let config = SuretyConfig::default();
            config.save_to_file(&path)?;
            info!("📝 Default config written to {}", path.display());
        }
        Commands::Simulate {
            config,
            oracles,
            journal_out,
        } => {
            let config = load_config(config.as_deref())?;
            init_tracing(cli.log_filter.as_deref().or(config.log_filter.as_deref()));

            let handle = Sequencer::spawn(config.clone())?;

            println!("== Scenario A: airline admission ==");
            for (airline, status) in run_scenario_a(&handle, &config).await? {
                println!("  {:<14} {}", airline.as_str(), status);
            }

            println!("== Scenario B: delayed flight payout ==");
            let report = match run_scenario_b(&handle, &config, oracles).await {
                Ok(report) => report,
                Err(e) => {
                    error!("Scenario B failed: {}", e);
                    return Err(e.into());
                }
            };
            println!("  flight        {}", report.flight);
            println!("  status        {}", report.status);
            println!("  premium       {}", format_units(report.premium));
            println!("  payout        {}", format_units(report.payout));
            match &report.second_claim {
                Some(e) => println!("  second claim  rejected ({})", e),
                None => println!("  second claim  ACCEPTED"),
            }
            println!("== Escrow ==");
            for (pool, balance) in &report.escrow.balances {
                println!("  {:<14} {}", pool.to_string(), format_units(*balance));
            }
            println!("  {:<14} {}", "total_held", format_units(report.escrow.total_held));
            println!("  {:<14} {}", "balanced", report.escrow.is_balanced());

            let journal = handle.journal().await?;
            println!("== Journal: {} commands, {} rejected ==", journal.len(), journal.failed().count());
            println!("  state digest  {}", handle.state_digest().await?);
            if let Some(path) = journal_out {
                journal.save_to_file(&path)?;
                info!("📝 Journal written to {}", path.display());
            }
        }
        Commands::Replay { journal, config } => {
            let config = load_config(config.as_deref())?;
            init_tracing(cli.log_filter.as_deref().or(config.log_filter.as_deref()));

            let journal = Journal::load_from_file(&journal)?;
            let app = replay(config, &journal)?;
            println!("replayed      {}", journal.len());
            println!("state digest  {}", app.state_digest()?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SuretyConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(SuretyConfig::load_from_file(path)?),
        None => Ok(SuretyConfig::default()),
    }
}

/// Stdout for everything the filter lets through, plus the `audit` notification lines.
fn init_tracing(filter: Option<&str>) {
    let env_filter = match filter {
        Some(f) => tracing_subscriber::EnvFilter::new(f),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_FILTER.into()),
    };

    let audit_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target() == "audit"
        }));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_filter(env_filter)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target() != "audit"
        }));

    tracing_subscriber::registry()
        .with(audit_layer)
        .with(stdout_layer)
        .init();
}
