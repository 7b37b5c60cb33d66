//! cpphistory - inspect and maintain incremental build history
//!
//! Works on the `history.xml` a native build keeps in each output directory.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cpphistory=info,convenient_history=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut table = match cli.open_table() {
        Ok(table) => table,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(2);
        }
    };

    match &cli.command {
        Commands::Show => {
            commands::show::execute(&table);
            ExitCode::SUCCESS
        }
        Commands::Check {
            signature,
            output,
            sources,
        } => {
            if commands::check::execute(&table, signature, output, sources) {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Commands::Record {
            signature,
            output,
            sources,
        } => match commands::record::execute(&mut table, signature, output, sources) {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                tracing::error!("{e}");
                ExitCode::from(2)
            }
        },
    }
}
