// Copyright (c) 2026 Ferrocard Contributors. MIT License.
// See LICENSE for details.

//! # FERROCARD Teller Terminal
//!
//! Entry point for the `ferrocard` binary. Parses CLI arguments,
//! initializes logging, opens the ledger, and hands control to the
//! interactive menu loop.
//!
//! The binary supports three subcommands:
//!
//! - `run`     — start the interactive teller session
//! - `init`    — create the data directory and the ledger, then exit
//! - `version` — print build version information

mod cli;
mod logging;
mod menu;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use ferrocard::bank::Bank;

use cli::{Commands, FerrocardCli};
use logging::LogFormat;
use menu::Shell;

fn main() -> Result<()> {
    let cli = FerrocardCli::parse();

    match cli.command {
        Commands::Run(args) => run_shell(args),
        Commands::Init(args) => init_ledger(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Opens the ledger and runs the interactive menu until the user exits.
fn run_shell(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        "ferrocard=info,ferrocard_cli=info",
        LogFormat::from_str_lossy(&args.log_format),
    );

    let data_dir = resolve_data_dir(args.data_dir)?;
    tracing::info!(data_dir = %data_dir.display(), "starting ferrocard");

    let bank = open_bank(&data_dir)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(bank, stdin.lock(), stdout.lock());
    shell.run().context("teller session failed")?;

    Ok(())
}

/// Creates the data directory and the ledger without starting a session.
fn init_ledger(args: cli::InitArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir)?;
    let bank = open_bank(&data_dir)?;

    println!("Initialized ledger at {}", data_dir.display());
    println!("Accounts on file: {}", bank.store().len());
    Ok(())
}

fn print_version() {
    println!("ferrocard {}", env!("CARGO_PKG_VERSION"));
}

/// Opens the bank over the `db` subdirectory of the data directory,
/// creating both on first use.
fn open_bank(data_dir: &Path) -> Result<Bank> {
    let db_path = data_dir.join("db");
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create data directory: {}", db_path.display()))?;

    Bank::open(&db_path)
        .with_context(|| format!("failed to open ledger at {}", db_path.display()))
}

/// Resolves the data directory: explicit flag/env value if given, else
/// `$HOME/.ferrocard`.
fn resolve_data_dir(arg: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = arg {
        return Ok(dir);
    }
    let home = std::env::var_os("HOME")
        .context("cannot determine home directory; pass --data-dir explicitly")?;
    Ok(PathBuf::from(home).join(ferrocard::config::DEFAULT_DATA_DIR))
}
