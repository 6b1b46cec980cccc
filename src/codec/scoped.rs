use chrono::{DateTime, SecondsFormat, Utc};
use csv::StringRecord;

use super::Row;
use crate::Result;
use crate::models::{ScopedEntry, SecretRecord, VariableRecord};

/// Import layout shared by the secrets and variables files
pub const SCOPED_IMPORT_HEADER: [&str; 5] = [
    "RepositoryID",
    "RepositoryName",
    "EnvironmentName",
    "Name",
    "Value",
];

pub const VARIABLE_EXPORT_HEADER: [&str; 7] = [
    "RepositoryID",
    "RepositoryName",
    "EnvironmentName",
    "VariableName",
    "VariableValue",
    "VariableCreatedAt",
    "VariableUpdatedAt",
];

pub const SECRET_EXPORT_HEADER: [&str; 6] = [
    "RepositoryID",
    "RepositoryName",
    "EnvironmentName",
    "SecretName",
    "SecretCreatedAt",
    "SecretUpdatedAt",
];

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

pub fn encode_variable_record(record: &VariableRecord) -> Vec<String> {
    vec![
        record.repository_id.to_string(),
        record.repository_name.clone(),
        record.environment.clone(),
        record.variable.name.clone(),
        record.variable.value.clone(),
        timestamp(record.variable.created_at),
        timestamp(record.variable.updated_at),
    ]
}

pub fn encode_secret_record(record: &SecretRecord) -> Vec<String> {
    vec![
        record.repository_id.to_string(),
        record.repository_name.clone(),
        record.environment.clone(),
        record.secret.name.clone(),
        timestamp(record.secret.created_at),
        timestamp(record.secret.updated_at),
    ]
}

/// Decode a secrets or variables import row. The value may be empty.
pub fn decode_scoped_row(record: &StringRecord) -> Result<ScopedEntry> {
    let row = Row::new(record);

    Ok(ScopedEntry {
        repository_id: row.required_u64(0, "RepositoryID")?,
        repository_name: row.non_empty(1, "RepositoryName")?.to_string(),
        environment: row.non_empty(2, "EnvironmentName")?.to_string(),
        name: row.non_empty(3, "Name")?.trim().to_string(),
        value: row.cell(4, "Value")?.to_string(),
    })
}
