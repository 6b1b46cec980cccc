//! Secrets and variables, both scoped to a (repository, environment) pair

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A name/value pair addressed to one repository environment.
///
/// This is the shape of a row in the secrets and variables import files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedEntry {
    pub repository_id: u64,
    pub repository_name: String,
    pub environment: String,
    pub name: String,
    pub value: String,
}

impl ScopedEntry {
    /// Human readable label used in logs and failure summaries
    pub fn label(&self) -> String {
        format!("{}/{}/{}", self.repository_name, self.environment, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The remote never returns a secret's value, only that it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretMetadata {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A variable row of the variables export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRecord {
    pub repository_id: u64,
    pub repository_name: String,
    pub environment: String,
    pub variable: Variable,
}

/// A secret row of the secrets export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub repository_id: u64,
    pub repository_name: String,
    pub environment: String,
    pub secret: SecretMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentPublicKey {
    pub key_id: String,
    /// Base64 encoded X25519 public key
    pub key: String,
}

/// Request body for creating or updating an environment secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptedSecret {
    pub encrypted_value: String,
    pub key_id: String,
}
