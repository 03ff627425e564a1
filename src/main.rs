//! filterbank CLI
//!
//! Command-line front end for the stereo filter bank.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::info;

use filterbank::cli::commands::{self, ApplyArgs};
use filterbank::cli::{Cli, Commands};
use filterbank::{FilterError, Result};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("filterbank v{}", env!("CARGO_PKG_VERSION"));

    match handle_command(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Apply {
            filter,
            input,
            output,
            frequency,
            bandwidth,
            block_frames,
            config,
        } => {
            let args = ApplyArgs {
                filter,
                frequency,
                bandwidth,
                block_frames,
            };
            commands::apply(&input, &output, &args, config.as_deref()).map(|_| ())
        }
        Commands::Info { path } => commands::info(&path),
        Commands::Coefficients {
            filter,
            sample_rate,
            frequency,
            bandwidth,
        } => commands::coefficients(filter, sample_rate, frequency, bandwidth).map(|_| ()),
        Commands::List => {
            commands::list();
            Ok(())
        }
    }
}

fn report(err: &FilterError) {
    eprintln!("Error ({} failed): {}", err.stage(), err);

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }

    if err.leaves_partial_output() {
        eprintln!("Outfile is incomplete.");
    }
    for suggestion in err.recovery_suggestions() {
        eprintln!("  - {}", suggestion);
    }
}
