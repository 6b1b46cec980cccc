use anyhow::{Context as _, Result};
use chrono::Local;
use std::fs::File;
use std::io::BufWriter;

use super::{ExportArgs, Report, connect, finish};
use crate::cli::Context;
use crate::models::Repository;
use crate::sync::{self, MissingRepoPolicy, RunSummary};

pub async fn execute(report: Report, args: ExportArgs, ctx: &Context) -> Result<()> {
    let on_missing = args
        .fail_on_missing_repo
        .then_some(MissingRepoPolicy::Abort);
    let (config, client) = connect(&args.connection, ctx, on_missing)?;

    let path = args
        .output_file
        .clone()
        .unwrap_or_else(|| report.default_file_name(Local::now()));

    let mut summary = RunSummary::new();

    ctx.output.step(&format!("Resolving repositories in {}", args.org));
    let repositories = sync::repositories(
        &client,
        &args.org,
        &args.repos,
        config.repositories.on_missing,
        &mut summary,
    )
    .await
    .with_context(|| format!("Failed to list repositories in {}", args.org))?;
    ctx.output
        .info(&format!("Exporting {}s from {} repositories", report.noun(), repositories.len()));

    let file = File::create(&path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    let out = BufWriter::new(file);

    let progress = ctx.output.progress_bar(repositories.len() as u64, "repositories");
    let tick = |repository: &Repository| {
        progress.set_message(repository.name.clone());
        progress.inc(1);
    };

    let result = match report {
        Report::Environments => {
            sync::export_environments(&client, &args.org, &repositories, out, &mut summary, tick)
                .await
        }
        Report::Variables => {
            sync::export_variables(&client, &args.org, &repositories, out, &mut summary, tick)
                .await
        }
        Report::Secrets => {
            sync::export_secrets(&client, &args.org, &repositories, out, &mut summary, tick).await
        }
    };
    progress.finish_and_clear();
    result.with_context(|| format!("Failed to write report {}", path.display()))?;

    finish(
        &ctx.output,
        &summary,
        args.allow_partial,
        &format!("Exported {} {} record(s)", summary.succeeded, report.noun()),
        &path,
    )
}
