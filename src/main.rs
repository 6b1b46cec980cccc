use anyhow::Result;
use clap::Parser;

use gh_environments::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run().await
}
