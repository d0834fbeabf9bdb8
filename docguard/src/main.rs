// docguard/src/main.rs
//! Docguard entry point.
//!
//! Builds the immutable analysis engine once, then dispatches to the
//! requested command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use docguard::cli::{Cli, Commands};
use docguard::commands;
use docguard::logger;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if args.quiet {
        logger::init_logger(Some(log::LevelFilter::Off));
    } else if args.debug {
        logger::init_logger(Some(log::LevelFilter::Debug));
    } else {
        logger::init_logger(None);
    }

    let engine = commands::build_engine(args.config.as_deref())
        .context("Failed to build the analysis engine")?;

    match &args.command {
        Commands::Analyze(cmd) => commands::analyze::run(&engine, cmd),
        Commands::Redact(cmd) => commands::redact::run(Arc::new(engine), cmd).await,
        Commands::RedactLiterals(cmd) => commands::redact::run_literals(&engine, cmd),
    }
}
