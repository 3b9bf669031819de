//! SlidePipe CLI — turn extracted web and PDF content into slide decks.
//!
//! Runs declarative pipelines over pre-extracted JSON and prints the
//! planned deck or the run report summary.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
