//! # gatehouse CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::io;
use std::process::ExitCode;

use clap::Parser;

/// gatehouse: request validation toolchain.
///
/// Lists the plugin namespace and validates payloads against it without
/// running the API server.
#[derive(Parser, Debug)]
#[command(name = "gatehouse", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the resource/subtype namespace.
    Plugins(gatehouse_cli::plugins::PluginsArgs),
    /// Validate a payload and print the outcome.
    Validate(gatehouse_cli::validate::ValidateArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "gatehouse CLI starting");
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Plugins(args) => {
            gatehouse_cli::plugins::run(&args, &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate(args) => {
            let valid = gatehouse_cli::validate::run(&args, io::stdin().lock(), &mut stdout)?;
            Ok(if valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
