//! CLI definitions and command dispatch

mod import;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

pub use import::handle_import_command;

#[derive(Parser)]
#[command(
    name = "commission-cli",
    about = "Import partner commission spreadsheets into a relational store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a CSV or Excel file of commission rows
    Import(ImportArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    /// Path to the input file (.csv, .xlsx or .xls)
    pub file: PathBuf,

    /// SQLite database to import into
    #[arg(long, default_value = "commissions.db")]
    pub database: PathBuf,

    /// Field delimiter for CSV input
    #[arg(long, default_value_t = ';')]
    pub delimiter: char,

    /// Run the full pipeline against an in-memory store without persisting
    #[arg(long)]
    pub dry_run: bool,

    /// Print the batch report as JSON instead of the rendered summary
    #[arg(long)]
    pub json: bool,
}

pub async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Import(args) => handle_import_command(args).await,
    }
}
