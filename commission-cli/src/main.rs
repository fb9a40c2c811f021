//! Command-line importer for partner commission spreadsheets
//!
//! Reads CSV or Excel files of commission rows and loads them into a
//! relational store: five deduplicated dimension entities plus an order and
//! a commission fact row per input row.

mod cli;
mod ingest;
mod pipeline;
mod store;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = cli::Cli::parse();
    cli::handle_command(cli.command).await
}
