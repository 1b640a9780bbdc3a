// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use rf_cli::{Cli, Commands, Parser};
use rf_core::{MigrateError, Migrator, run_batch};
use std::process::ExitCode;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = cli.logging.init("repoferry") {
        eprintln!("repoferry: failed to initialize logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("repoferry: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(command: Commands) -> Result<(), MigrateError> {
    match command {
        Commands::Migrate(args) => {
            let job = args.into_job();
            let outcome = Migrator::new().run(&job).await?;
            info!(repo = %outcome.repo_path.display(), "migration complete");
            println!("migrated {}", outcome.repo_path.display());
            Ok(())
        }
        Commands::Batch(args) => {
            let plan = args.into_plan();
            let summary = run_batch(&plan).await?;
            for outcome in &summary.outcomes {
                match &outcome.result {
                    Ok(_) => println!("{}: ok", outcome.repo),
                    Err(e) => println!("{}: failed ({e})", outcome.repo),
                }
            }
            match summary.into_first_error() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }
}
