//! Tripcart CLI - track travel purchases from the terminal
//!
//! Writes go straight to the backend when it is reachable and are queued in a
//! local cache otherwise; `tripcart sync` or `tripcart watch` pushes the queue.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

use clap::Parser;
use tripcart_core::view::ItemFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::{run_add, AddArgs};
use crate::commands::auth_cmd::run_auth;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::list::run_list;
use crate::commands::mark::{run_mark, Mark};
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::commands::watch::run_watch;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tripcart=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Add {
            name,
            price,
            currency,
            to,
            rate,
            photo,
        } => {
            let args = AddArgs {
                name,
                price,
                currency,
                to,
                rate,
                photo,
            };
            run_add(args, &global).await?;
        }
        Commands::List {
            liked,
            purchased,
            search,
            limit,
            json,
        } => {
            let filter = ItemFilter {
                liked_only: liked,
                purchased_only: purchased,
                search,
                limit: Some(limit),
            };
            run_list(&filter, json, &global).await?;
        }
        Commands::Like { id } => run_mark(Mark::Like, &id, &global).await?,
        Commands::Unlike { id } => run_mark(Mark::Unlike, &id, &global).await?,
        Commands::Purchase { id } => run_mark(Mark::Purchase, &id, &global).await?,
        Commands::Unpurchase { id } => run_mark(Mark::Unpurchase, &id, &global).await?,
        Commands::Delete { id } => run_delete(&id, &global).await?,
        Commands::Sync { json } => run_sync(json, &global).await?,
        Commands::Status => run_status(&global).await?,
        Commands::Watch { interval } => run_watch(interval, &global).await?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
        Commands::Config { command } => run_config(command, global.profile.as_deref())?,
        Commands::Auth { command } => run_auth(command, global.profile.as_deref()).await?,
    }

    Ok(())
}
