use anyhow::Result;
use clap::{Args, Subcommand};

use super::{ExportArgs, ImportArgs, Report, export, import};
use crate::cli::Context;

#[derive(Args)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

#[derive(Subcommand)]
pub enum SecretsCommand {
    /// Export secret names and timestamps (values cannot be read back)
    List(ExportArgs),
    /// Create or overwrite secrets from a CSV file
    Create(ImportArgs),
}

impl SecretsCommand {
    pub fn debug(&self) -> bool {
        match self {
            SecretsCommand::List(args) => args.connection.debug,
            SecretsCommand::Create(args) => args.connection.debug,
        }
    }
}

pub async fn execute(args: SecretsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        SecretsCommand::List(args) => export::execute(Report::Secrets, args, ctx).await,
        SecretsCommand::Create(args) => import::execute(Report::Secrets, args, ctx).await,
    }
}
