//! # CLI Interface
//!
//! Defines the command-line argument structure for `ferrocard` using
//! `clap` derive. Supports three subcommands: `run`, `init`, and
//! `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// FERROCARD teller terminal.
///
/// A menu-driven shell over the FERROCARD card ledger: open accounts,
/// log in with card number and PIN, check balances, deposit, and
/// transfer between accounts.
#[derive(Parser, Debug)]
#[command(
    name = "ferrocard",
    about = "FERROCARD teller terminal",
    version,
    propagate_version = true
)]
pub struct FerrocardCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `ferrocard` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive teller session.
    Run(RunArgs),
    /// Initialize the data directory and the account ledger without
    /// starting a session.
    Init(InitArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the data directory where the ledger is stored.
    ///
    /// Defaults to `.ferrocard` under the user's home directory.
    /// Created on first run if it does not exist.
    #[arg(long, short = 'd', env = "FERROCARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "FERROCARD_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path to the data directory to initialize.
    #[arg(long, short = 'd', env = "FERROCARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}
