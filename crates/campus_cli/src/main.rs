//! CLI entry point for local portal inspection.
//!
//! # Responsibility
//! - Open the configured store, load every entity list and print counters.
//! - Keep output deterministic for quick local sanity checks.

use campus_core::db::open_location;
use campus_core::{init_logging, CampusPortal, PortalConfig, SqliteKvStore, SystemClock};
use log::error;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("campus_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = PortalConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    let conn = open_location(&config.storage)?;
    let store = SqliteKvStore::try_new(&conn)?;
    let mut portal = CampusPortal::new(&store, Arc::new(SystemClock), config.repo_options());

    println!("campus_core version={}", campus_core::core_version());
    for (key, outcome) in portal.load_all() {
        match outcome {
            Ok(outcome) => println!("load {key} {outcome:?}"),
            Err(err) => println!("load {key} failed: {err}"),
        }
    }

    let dashboard = portal.dashboard();
    for summary in &dashboard.entities {
        let counters: Vec<String> = summary
            .by_status
            .iter()
            .map(|(status, count)| format!("{status}={count}"))
            .collect();
        println!(
            "{:<18} total={:<3} {}",
            summary.label,
            summary.total,
            counters.join(" ")
        );
    }
    println!("records total={}", dashboard.total_records());
    Ok(())
}
