//! Sigil CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use sigil_cli::{
    Args,
    error_adapter::{render, to_reportables},
};

/// Exit status when the program was written but still has unresolved issues.
const EXIT_UNRESOLVED: i32 = 2;

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Sigil");
    debug!(args:?; "Parsed arguments");

    match sigil_cli::run(&args) {
        Ok(outcome) if outcome.has_unresolved_issues() => {
            info!("Completed with unresolved issues");
            process::exit(EXIT_UNRESOLVED);
        }
        Ok(_) => info!("Completed successfully"),
        Err(err) => {
            for reportable in to_reportables(&err) {
                error!("{}", render(&reportable));
            }
            process::exit(1);
        }
    }
}
