//! Binary crate for the `postal` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logger setup
//! - Writing lookup results to stdout

use clap::Parser;

mod cli;
mod logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    logger::init(cmd.verbose);
    cmd.run().await
}
