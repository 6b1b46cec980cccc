//! Command-line interface
//!
//! Parses arguments with clap, installs the tracing subscriber once, and
//! dispatches to the command implementations.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
mod output;

pub use output::Output;

use commands::{ExportArgs, ImportArgs, Report, secrets, variables};

/// Export and import GitHub deployment environments, secrets and variables as CSV
#[derive(Parser)]
#[command(name = "gh-environments", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export the organization's environments to a CSV report
    List(ExportArgs),
    /// Create or update environments from a CSV file
    Create(ImportArgs),
    /// Export or import environment secrets
    Secrets(secrets::SecretsArgs),
    /// Export or import environment variables
    Variables(variables::VariablesArgs),
}

impl Commands {
    fn debug(&self) -> bool {
        match self {
            Commands::List(args) => args.connection.debug,
            Commands::Create(args) => args.connection.debug,
            Commands::Secrets(args) => args.command.debug(),
            Commands::Variables(args) => args.command.debug(),
        }
    }
}

/// What every command receives besides its own arguments
pub struct Context {
    pub output: Output,
    pub config: Option<PathBuf>,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let verbose = if self.command.debug() {
            self.verbose.max(2)
        } else {
            self.verbose
        };
        setup_logging(verbose, self.quiet);

        let ctx = Context {
            output: Output::new(verbose > 0, self.quiet),
            config: self.config,
        };

        match self.command {
            Commands::List(args) => commands::export::execute(Report::Environments, args, &ctx).await,
            Commands::Create(args) => commands::import::execute(Report::Environments, args, &ctx).await,
            Commands::Secrets(args) => secrets::execute(args, &ctx).await,
            Commands::Variables(args) => variables::execute(args, &ctx).await,
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            // reqwest and its connection pool are noisy below info
            1 => tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,hyper=warn,hyper_util=warn,reqwest=info"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_arguments() {
        let cli = Cli::try_parse_from([
            "gh-environments",
            "list",
            "acme",
            "api",
            "web",
            "-o",
            "out.csv",
            "--fail-on-missing-repo",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.org, "acme");
                assert_eq!(args.repos, vec!["api", "web"]);
                assert_eq!(args.output_file, Some(PathBuf::from("out.csv")));
                assert!(args.fail_on_missing_repo);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_debug_flag_is_seen_through_subcommands() {
        let cli = Cli::try_parse_from([
            "gh-environments",
            "secrets",
            "create",
            "acme",
            "-f",
            "secrets.csv",
            "-d",
            "--token",
            "abc",
        ])
        .unwrap();

        assert!(cli.command.debug());
    }

    #[test]
    fn test_create_requires_file() {
        assert!(Cli::try_parse_from(["gh-environments", "create", "acme"]).is_err());
    }
}
