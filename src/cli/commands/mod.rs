//! Command implementations
//!
//! Exports and imports share one runner each; the `secrets` and `variables`
//! modules only route their subcommands to them.

use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, Local};
use clap::Args;
use std::path::{Path, PathBuf};

use super::{Context, Output};
use crate::auth::resolve_token;
use crate::config::{AppConfig, Overrides};
use crate::github::GitHubClient;
use crate::sync::{MissingRepoPolicy, RunSummary};

pub mod export;
pub mod import;
pub mod secrets;
pub mod variables;

/// Options shared by every command that talks to GitHub
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// GitHub token (defaults to GH_TOKEN, GITHUB_TOKEN or `gh auth token`)
    #[arg(short, long)]
    pub token: Option<String>,

    /// GitHub host, e.g. github.com or a GitHub Enterprise Server host
    #[arg(long)]
    pub hostname: Option<String>,

    /// Enable debug logging (same as -vv)
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Organization that owns the repositories
    pub org: String,

    /// Repositories to include; all of the organization's when omitted
    pub repos: Vec<String>,

    /// Report file to write (defaults to a timestamped name)
    #[arg(short = 'o', long = "output-file", value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Fail instead of skipping when a named repository does not exist
    #[arg(long)]
    pub fail_on_missing_repo: bool,

    /// Exit successfully even if some records failed
    #[arg(long)]
    pub allow_partial: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Organization that owns the repositories
    pub org: String,

    /// CSV file to import
    #[arg(short = 'f', long = "from-file", value_name = "FILE")]
    pub from_file: PathBuf,

    /// Exit successfully even if some records failed
    #[arg(long)]
    pub allow_partial: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// The three kinds of CSV file the tool reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Environments,
    Variables,
    Secrets,
}

impl Report {
    pub fn noun(&self) -> &'static str {
        match self {
            Report::Environments => "environment",
            Report::Variables => "variable",
            Report::Secrets => "secret",
        }
    }

    /// `report-<YYYYmmddHHMMSS>.csv`, with the kind inserted for secrets and variables
    pub fn default_file_name(&self, now: DateTime<Local>) -> PathBuf {
        let stamp = now.format("%Y%m%d%H%M%S");
        let name = match self {
            Report::Environments => format!("report-{stamp}.csv"),
            Report::Variables => format!("report-variables-{stamp}.csv"),
            Report::Secrets => format!("report-secrets-{stamp}.csv"),
        };
        PathBuf::from(name)
    }
}

/// Load configuration, resolve a token and build the API client
pub(crate) fn connect(
    connection: &ConnectionArgs,
    ctx: &Context,
    on_missing: Option<MissingRepoPolicy>,
) -> Result<(AppConfig, GitHubClient)> {
    let overrides = Overrides {
        hostname: connection.hostname.clone(),
        on_missing,
    };
    let config = AppConfig::load(ctx.config.as_deref(), &overrides)
        .context("Failed to load configuration")?;

    let token = resolve_token(
        &config.github.hostname,
        connection.token.as_deref(),
        config.github.token.as_deref(),
    )
    .context("Failed to authenticate")?;
    ctx.output.verbose(&format!(
        "Authenticated to {} using {}",
        config.github.hostname, token.origin
    ));

    let client = GitHubClient::new(&config.github, &token.token)
        .context("Failed to create GitHub client")?;
    tracing::debug!("REST API root {}", client.endpoints().rest);

    Ok((config, client))
}

/// Print the outcome and turn record failures into an error exit
pub(crate) fn finish(
    output: &Output,
    summary: &RunSummary,
    allow_partial: bool,
    done: &str,
    file: &Path,
) -> Result<()> {
    if !summary.skipped.is_empty() {
        output.warning(&format!(
            "Skipped missing repositories: {}",
            summary.skipped.join(", ")
        ));
    }

    if summary.has_failures() {
        output.error(&format!(
            "{} failure(s) across {} record(s):",
            summary.failures.len(),
            summary.failed_records()
        ));
        for failure in &summary.failures {
            output.list_item(&failure.to_string());
        }
    }

    output.success(&format!("{} ({})", done, file.display()));
    output.summary_stats("Succeeded:", summary.succeeded);
    output.summary_stats("Failed:", summary.failed_records());

    if !summary.is_success(allow_partial) {
        bail!(
            "{} record(s) failed; rerun with --allow-partial to accept a partial result",
            summary.failed_records()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_report_names() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        assert_eq!(
            Report::Environments.default_file_name(now),
            PathBuf::from("report-20240309140507.csv")
        );
        assert_eq!(
            Report::Variables.default_file_name(now),
            PathBuf::from("report-variables-20240309140507.csv")
        );
        assert_eq!(
            Report::Secrets.default_file_name(now),
            PathBuf::from("report-secrets-20240309140507.csv")
        );
    }
}
