//! XmlFetch CLI — fetch an XML document and extract one value with XPath.
//!
//! Runs the same node a workflow host would, with an in-memory variable
//! store standing in for the host's.

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
