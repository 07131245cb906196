//! CLI module for Stockfolio
//!
//! Command-line interface for the portfolio tracker. Uses clap for argument
//! parsing and a structured command pattern: each subcommand owns its args
//! struct and an async `execute`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod args;
pub mod commands;

use crate::data_paths::{DataPaths, DEFAULT_DATA_DIR};
use crate::logging::{init_logging, LoggingConfig};

use commands::add::{AddArgs, AddCommand};
use commands::init::{InitArgs, InitCommand};
use commands::reconcile::{ReconcileArgs, ReconcileCommand};
use commands::refresh::{RefreshArgs, RefreshCommand};
use commands::sell::{SellArgs, SellCommand};
use commands::summary::{SummaryArgs, SummaryCommand};

#[derive(Parser)]
#[command(name = "stockfolio")]
#[command(version)]
#[command(about = "CSV-backed equities portfolio tracker", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory path (default: ./data)
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create empty portfolio ledgers
    Init(InitArgs),

    /// Open a new position (buy)
    Add(AddArgs),

    /// Refresh live valuation for all open positions
    Refresh(RefreshArgs),

    /// Sell part or all of an open position
    Sell(SellArgs),

    /// Show the aggregated portfolio summary
    Summary(SummaryArgs),

    /// Detect and repair a sale interrupted between ledger writes
    Reconcile(ReconcileArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let data_paths = DataPaths::new(&self.data_dir);

        // Ensure all directories exist
        data_paths.ensure_directories()?;

        init_logging(LoggingConfig::new(data_paths.clone(), self.verbose > 0))?;

        match self.command {
            Commands::Init(args) => InitCommand::new(args).execute(data_paths).await,
            Commands::Add(args) => AddCommand::new(args).execute(data_paths).await,
            Commands::Refresh(args) => RefreshCommand::new(args).execute(data_paths).await,
            Commands::Sell(args) => SellCommand::new(args).execute(data_paths).await,
            Commands::Summary(args) => SummaryCommand::new(args).execute(data_paths).await,
            Commands::Reconcile(args) => ReconcileCommand::new(args).execute(data_paths).await,
        }
    }
}
