use anyhow::Result;
use clap::{Args, Subcommand};

use super::{ExportArgs, ImportArgs, Report, export, import};
use crate::cli::Context;

#[derive(Args)]
pub struct VariablesArgs {
    #[command(subcommand)]
    pub command: VariablesCommand,
}

#[derive(Subcommand)]
pub enum VariablesCommand {
    /// Export variables with their values
    List(ExportArgs),
    /// Create variables from a CSV file, updating ones that already exist
    Create(ImportArgs),
}

impl VariablesCommand {
    pub fn debug(&self) -> bool {
        match self {
            VariablesCommand::List(args) => args.connection.debug,
            VariablesCommand::Create(args) => args.connection.debug,
        }
    }
}

pub async fn execute(args: VariablesArgs, ctx: &Context) -> Result<()> {
    match args.command {
        VariablesCommand::List(args) => export::execute(Report::Variables, args, ctx).await,
        VariablesCommand::Create(args) => import::execute(Report::Variables, args, ctx).await,
    }
}
