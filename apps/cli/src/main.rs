//! SiteDigest CLI — sitemap-driven site digest generator.
//!
//! Crawls a website's sitemap (local or remote) and writes a single
//! `llms.txt`-style digest of its pages, grouped by section.

mod commands;

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
