use anyhow::{Context as _, Result};
use std::fs::File;
use std::io::BufReader;

use super::{ImportArgs, Report, connect, finish};
use crate::cli::Context;
use crate::sync::{self, RunSummary};

pub async fn execute(report: Report, args: ImportArgs, ctx: &Context) -> Result<()> {
    // A missing file should fail before any credential lookup
    let file = File::open(&args.from_file)
        .with_context(|| format!("Failed to open {}", args.from_file.display()))?;
    let input = BufReader::new(file);

    let (_, client) = connect(&args.connection, ctx, None)?;
    let mut summary = RunSummary::new();

    ctx.output.step(&format!(
        "Importing {}s from {} into {}",
        report.noun(),
        args.from_file.display(),
        args.org
    ));

    let result = match report {
        Report::Environments => {
            sync::import_environments(&client, &args.org, input, &mut summary).await
        }
        Report::Secrets => sync::import_secrets(&client, input, &mut summary).await,
        Report::Variables => sync::import_variables(&client, input, &mut summary).await,
    };
    result.with_context(|| format!("Failed to read {}", args.from_file.display()))?;

    finish(
        &ctx.output,
        &summary,
        args.allow_partial,
        &format!("Imported {} {} record(s)", summary.succeeded, report.noun()),
        &args.from_file,
    )
}
