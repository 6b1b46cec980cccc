//! Export passes: repositories in, one CSV report out
//!
//! Rows are written in repository order, then environment order, and the
//! writer is flushed once when the pass ends.

use std::io::Write;

use super::aggregate::{absent_as_default, aggregate_repository, environments_of};
use super::{RunSummary, Stage};
use crate::codec::{
    ENVIRONMENT_EXPORT_HEADER, SECRET_EXPORT_HEADER, VARIABLE_EXPORT_HEADER,
    encode_environment_record, encode_secret_record, encode_variable_record, writer_with_header,
};
use crate::github::{EnvironmentAccess, SecretAccess, VariableAccess};
use crate::models::{EnvironmentRecord, Repository, SecretRecord, VariableRecord};
use crate::Result;

/// One row per environment, with secret and variable totals
pub async fn export_environments<A, W, P>(
    api: &A,
    owner: &str,
    repositories: &[Repository],
    out: W,
    summary: &mut RunSummary,
    mut on_repository: P,
) -> Result<()>
where
    A: EnvironmentAccess + SecretAccess + VariableAccess + ?Sized,
    W: Write,
    P: FnMut(&Repository),
{
    let mut writer = writer_with_header(out, &ENVIRONMENT_EXPORT_HEADER)?;
    let mut sink = |record: EnvironmentRecord| -> Result<()> {
        writer.write_record(encode_environment_record(&record))?;
        Ok(())
    };

    for repository in repositories {
        on_repository(repository);
        aggregate_repository(api, owner, repository, summary, &mut sink).await?;
    }

    writer.flush()?;
    Ok(())
}

/// One row per variable, values included
pub async fn export_variables<A, W, P>(
    api: &A,
    owner: &str,
    repositories: &[Repository],
    out: W,
    summary: &mut RunSummary,
    mut on_repository: P,
) -> Result<()>
where
    A: EnvironmentAccess + VariableAccess + ?Sized,
    W: Write,
    P: FnMut(&Repository),
{
    let mut writer = writer_with_header(out, &VARIABLE_EXPORT_HEADER)?;

    for repository in repositories {
        on_repository(repository);
        for api_env in environments_of(api, owner, repository, summary).await {
            let label = format!("{}/{}", repository.name, api_env.name);
            tracing::debug!("Gathering variables for {}", label);

            let listing = match absent_as_default(api.variables(repository.id, &api_env.name).await)
            {
                Ok(listing) => listing,
                Err(e) => {
                    summary.record_failure(label.as_str(), Stage::ListVariables, &e);
                    continue;
                }
            };

            for variable in listing.items {
                let record = VariableRecord {
                    repository_id: repository.id,
                    repository_name: repository.name.clone(),
                    environment: api_env.name.clone(),
                    variable,
                };
                writer.write_record(encode_variable_record(&record))?;
                summary.record_success();
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// One row per secret: names and timestamps, never values
pub async fn export_secrets<A, W, P>(
    api: &A,
    owner: &str,
    repositories: &[Repository],
    out: W,
    summary: &mut RunSummary,
    mut on_repository: P,
) -> Result<()>
where
    A: EnvironmentAccess + SecretAccess + ?Sized,
    W: Write,
    P: FnMut(&Repository),
{
    let mut writer = writer_with_header(out, &SECRET_EXPORT_HEADER)?;

    for repository in repositories {
        on_repository(repository);
        for api_env in environments_of(api, owner, repository, summary).await {
            let label = format!("{}/{}", repository.name, api_env.name);
            tracing::debug!("Gathering secrets for {}", label);

            let listing = match absent_as_default(api.secrets(repository.id, &api_env.name).await) {
                Ok(listing) => listing,
                Err(e) => {
                    summary.record_failure(label.as_str(), Stage::ListSecrets, &e);
                    continue;
                }
            };

            for secret in listing.items {
                let record = SecretRecord {
                    repository_id: repository.id,
                    repository_name: repository.name.clone(),
                    environment: api_env.name.clone(),
                    secret,
                };
                writer.write_record(encode_secret_record(&record))?;
                summary.record_success();
            }
        }
    }

    writer.flush()?;
    Ok(())
}
