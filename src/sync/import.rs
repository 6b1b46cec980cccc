//! Import passes: one CSV file in, sequential create/update calls out
//!
//! The whole file is read and decoded up front. Rows that fail to decode and
//! rows whose calls fail are recorded in the summary; the pass always moves on
//! to the next row.

use csv::StringRecord;
use std::io::Read;

use super::{RunSummary, Stage};
use crate::codec::{InputRow, decode_environment_row, decode_scoped_row, read_rows};
use crate::crypto;
use crate::github::{EnvironmentAccess, EnvironmentSettings, SecretAccess, VariableAccess};
use crate::models::{EncryptedSecret, EnvironmentImport, ScopedEntry};
use crate::{Error, Result};

/// A record failure tagged with the step that produced it
type StageResult = std::result::Result<(), (Stage, Error)>;

/// Decode every row, recording the ones that could not be read or decoded
fn decode_all<T>(
    rows: Vec<InputRow>,
    decode: fn(&StringRecord) -> Result<T>,
    summary: &mut RunSummary,
) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match row.record.and_then(|record| decode(&record)) {
            Ok(item) => Some(item),
            Err(e) => {
                summary.record_failure(format!("line {}", row.line), Stage::Decode, &e);
                None
            }
        })
        .collect()
}

/// Upsert each environment, then create its branch policies (custom policy
/// only) and its enabled custom protection rules
pub async fn import_environments<A, R>(
    api: &A,
    owner: &str,
    input: R,
    summary: &mut RunSummary,
) -> Result<()>
where
    A: EnvironmentAccess + ?Sized,
    R: Read,
{
    let rows = read_rows(input)?;
    let imports = decode_all(rows, decode_environment_row, summary);
    tracing::info!("Importing {} environment(s) into {}", imports.len(), owner);

    for import in &imports {
        if import_environment(api, owner, import, summary).await {
            summary.record_success();
        }
    }

    Ok(())
}

async fn import_environment<A>(
    api: &A,
    owner: &str,
    import: &EnvironmentImport,
    summary: &mut RunSummary,
) -> bool
where
    A: EnvironmentAccess + ?Sized,
{
    let label = import.label();
    let repo = import.repository_name.as_str();
    let environment = &import.environment;

    tracing::debug!("Upserting environment {}", label);
    let settings = EnvironmentSettings::from(environment);
    if let Err(e) = api
        .upsert_environment(owner, repo, &environment.name, &settings)
        .await
    {
        summary.record_failure(label.as_str(), Stage::UpsertEnvironment, &e);
        return false;
    }

    let mut complete = true;

    if environment.branch_policy.is_custom() {
        for pattern in &environment.branches {
            tracing::debug!("Creating {} policy {} on {}", pattern.kind.as_str(), pattern.name, label);
            if let Err(e) = api
                .create_branch_policy(owner, repo, &environment.name, pattern)
                .await
            {
                summary.record_failure(
                    format!("{label} [{}]", pattern.name),
                    Stage::CreateBranchPolicy,
                    &e,
                );
                complete = false;
            }
        }
    }

    for rule in environment.custom_rules.iter().filter(|r| r.enabled) {
        tracing::debug!("Enabling protection app {} on {}", rule.slug, label);
        if let Err(e) = api
            .create_protection_rule(owner, repo, &environment.name, rule.integration_id)
            .await
        {
            summary.record_failure(
                format!("{label} [{}]", rule.slug),
                Stage::CreateProtectionRule,
                &e,
            );
            complete = false;
        }
    }

    complete
}

/// Seal and store each secret under its environment's current public key
pub async fn import_secrets<A, R>(api: &A, input: R, summary: &mut RunSummary) -> Result<()>
where
    A: SecretAccess + ?Sized,
    R: Read,
{
    let rows = read_rows(input)?;
    let entries = decode_all(rows, decode_scoped_row, summary);
    tracing::info!("Importing {} secret(s)", entries.len());

    for entry in &entries {
        match import_secret(api, entry).await {
            Ok(()) => summary.record_success(),
            Err((stage, e)) => summary.record_failure(entry.label(), stage, &e),
        }
    }

    Ok(())
}

async fn import_secret<A>(api: &A, entry: &ScopedEntry) -> StageResult
where
    A: SecretAccess + ?Sized,
{
    tracing::debug!("Creating secret {}", entry.label());

    // Keys rotate, so one is fetched for every secret
    let key = api
        .public_key(entry.repository_id, &entry.environment)
        .await
        .map_err(|e| (Stage::PublicKey, e))?;

    let encrypted_value =
        crypto::encrypt(&key.key, &entry.value).map_err(|e| (Stage::Encrypt, e))?;

    let secret = EncryptedSecret {
        encrypted_value,
        key_id: key.key_id,
    };
    api.put_secret(entry.repository_id, &entry.environment, &entry.name, &secret)
        .await
        .map_err(|e| (Stage::PutSecret, e))
}

/// Create each variable, updating it in place when it already exists
pub async fn import_variables<A, R>(api: &A, input: R, summary: &mut RunSummary) -> Result<()>
where
    A: VariableAccess + ?Sized,
    R: Read,
{
    let rows = read_rows(input)?;
    let entries = decode_all(rows, decode_scoped_row, summary);
    tracing::info!("Importing {} variable(s)", entries.len());

    for entry in &entries {
        match import_variable(api, entry).await {
            Ok(()) => summary.record_success(),
            Err((stage, e)) => summary.record_failure(entry.label(), stage, &e),
        }
    }

    Ok(())
}

async fn import_variable<A>(api: &A, entry: &ScopedEntry) -> StageResult
where
    A: VariableAccess + ?Sized,
{
    tracing::debug!("Creating variable {}", entry.label());

    match api
        .create_variable(entry.repository_id, &entry.environment, &entry.name, &entry.value)
        .await
    {
        Ok(()) => Ok(()),
        Err(e) if e.is_conflict() => {
            tracing::debug!("Variable {} exists, updating", entry.label());
            api.update_variable(entry.repository_id, &entry.environment, &entry.name, &entry.value)
                .await
                .map_err(|e| (Stage::UpdateVariable, e))
        }
        Err(e) => Err((Stage::CreateVariable, e)),
    }
}
