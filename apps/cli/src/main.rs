//! tenderstat CLI: yearly procurement statistics for one company.
//!
//! Fetches raw tender records from the scrape API (or a saved response),
//! cleans them, and prints the aggregate tables.

mod commands;
mod output;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
