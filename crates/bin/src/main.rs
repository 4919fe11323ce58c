use std::sync::Arc;

use clap::Parser;
use concord::{LockManager, ResolutionRegistry, VersionGraph, store::InMemory};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, ConflictCommand, GraphCommand, LockCommand};
use output::OutputFormat;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = match &cli.log {
        Some(directives) => EnvFilter::new(directives),
        None => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("concord=info"))
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> commands::CommandResult {
    let format = OutputFormat::from(cli.format);
    let store = Arc::new(InMemory::load_from_file(&cli.data_file).await?);
    tracing::debug!(path = %cli.data_file.display(), "Opened store");

    let mutated = match &cli.command {
        Commands::Graph(command) => {
            let graph = VersionGraph::new(store.clone());
            commands::graph::run(&graph, command, format).await?;
            matches!(command, GraphCommand::Append { .. })
        }
        Commands::Resolve(args) => {
            let registry = ResolutionRegistry::with_defaults(store.clone());
            commands::resolve::resolve(&registry, args, format).await?;
            true
        }
        Commands::Strategies => {
            let registry = ResolutionRegistry::with_defaults(store.clone());
            commands::resolve::strategies(&registry, format)?;
            false
        }
        Commands::Records(args) => {
            let registry = ResolutionRegistry::with_defaults(store.clone());
            commands::resolve::records(&registry, args, format).await?;
            false
        }
        Commands::Lock(command) => {
            let locks = LockManager::new(store.clone());
            commands::lock::run(&locks, command, format).await?;
            // check_out may also reap lapsed locks and edit the queue.
            !matches!(
                command,
                LockCommand::List { .. } | LockCommand::Queue { .. }
            )
        }
        Commands::Conflict(command) => {
            let registry = ResolutionRegistry::with_defaults(store.clone());
            commands::conflict::run(&registry, command, format).await?;
            !matches!(command, ConflictCommand::Pending)
        }
    };

    if mutated {
        store.save_to_file(&cli.data_file).await?;
        tracing::debug!(path = %cli.data_file.display(), "Saved store");
    }
    Ok(())
}
