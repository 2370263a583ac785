//! # Test-Plan Import
//!
//! Converts engineering test-plan workbooks into the CSV format the Zephyr
//! test-management tool imports.
//!
//! ## Features
//!
//! - **Workbook formats**: Office Open XML (`.xlsx`, `.xlsm`) and OpenDocument (`.ods`)
//! - **Sheet selection**: placeholder (`Sheet*`) and `Definitions` sheets are skipped,
//!   extra glob exclusions and an inclusion filter can be given
//! - **Classification policies**: `precondition`, `baseline` and `uniform` decide
//!   priority, precondition, folder and estimate for every test case
//! - **Roster lookup**: the default owner is resolved from a user export and the team
//!   roster is written next to it
//! - **Output**: one import file per workbook or one per sheet
//!
//! ## Usage
//!
//! ```text
//! testplan-import <WORKSPACE> <WORKBOOK> [--policy baseline] [--component LNA]
//! ```
mod classifier;
mod cli;
mod config;
mod emitter;
mod error;
mod helpers;
mod pipeline;
mod roster;
mod spreadsheet;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Cli::parse().into_config().context("invalid arguments")?;
    let summary = pipeline::run(&config)
        .with_context(|| format!("failed to import {}", config.workbook.display()))?;
    for output in &summary.outputs {
        info!(path = %output.display(), "wrote import file");
    }
    info!(
        sheets = summary.sheets,
        records = summary.records,
        owner = %summary.owner,
        "import finished"
    );
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
