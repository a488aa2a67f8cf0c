//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `giftlink_scout` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Exit codes
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use giftlink_scout::config::Opt;
use giftlink_scout::initialization::init_logger_with;
use giftlink_scout::run_command;

fn main() -> Result<()> {
    let opt = Opt::parse();

    let log_level = opt.log_level.clone();
    let log_format = opt.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_command(opt) {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("scout error: {:#}", e);
            process::exit(1);
        }
    }
}
