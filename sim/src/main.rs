//! Escrow Scenario Simulator
//!
//! Replays a scripted sequence of escrow instructions against the in-memory
//! ledger and checks every outcome against its expectation.
//!
//! Usage:
//!   escrow-sim                         run `$ESCROW_SIM_CONFIG` (default `escrow-sim.toml`)
//!   escrow-sim --write-default <path>  write the built-in scenario as TOML

mod config;
mod scenario;

use anyhow::{bail, Context, Result};
use config::Config;
use scenario::Simulator;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {}
        [flag, path] if flag == "--write-default" => return Config::write_default(path),
        _ => bail!("usage: escrow-sim [--write-default <path>]"),
    }

    log::info!("Starting escrow simulator");

    // Load configuration
    let config = match Config::load()? {
        Some(config) => config,
        None => {
            log::warn!("No config file found, using built-in scenario");
            Config::default_scenario()
        }
    };

    log::info!("Program: {}", config.program_id);
    log::info!(
        "{} participants, {} steps, fee {} lamports",
        config.participants.len(),
        config.steps.len(),
        config.transaction_fee
    );

    let mut sim = Simulator::new(&config).context("Invalid simulator config")?;
    let reports = sim.run(&config.steps).context("Scenario failed")?;

    for participant in &config.participants {
        if let Some(balance) = sim.balance(&participant.name) {
            log::info!("{}: {} lamports", participant.name, balance);
        }
    }

    let mut pairs: Vec<(&str, &str)> = config
        .steps
        .iter()
        .map(|s| (s.initializer.as_str(), s.receiver.as_str()))
        .collect();
    pairs.sort_unstable();
    pairs.dedup();
    for (initializer, receiver) in pairs {
        if let Some(balance) = sim.escrow_balance(initializer, receiver) {
            log::info!("escrow {}->{}: {} lamports", initializer, receiver, balance);
        }
    }

    let rejected = reports
        .iter()
        .filter(|r| r.outcome != scenario::OK)
        .inspect(|r| log::debug!("step {} ({:?}) rejected as expected", r.index, r.op))
        .count();
    log::debug!("ledger total: {} lamports", sim.ledger().total_lamports());
    log::info!(
        "All {} steps matched expectations ({} expected rejections)",
        reports.len(),
        rejected
    );

    Ok(())
}
