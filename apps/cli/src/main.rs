//! Câmara explorer CLI: browse propositions, polls and votes from the
//! Chamber of Deputies open-data API, with generated plain-language
//! explanations.

mod commands;
mod progress;
mod render;
mod retry;

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
