//! Per-record outcome of one export or import pass

use std::fmt;

use crate::Error;

/// The step of a pass at which a record failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decode,
    ListEnvironments,
    BranchPolicies,
    ProtectionRules,
    SecretCount,
    VariableCount,
    ListSecrets,
    ListVariables,
    UpsertEnvironment,
    CreateBranchPolicy,
    CreateProtectionRule,
    PublicKey,
    Encrypt,
    PutSecret,
    CreateVariable,
    UpdateVariable,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Decode => "decode row",
            Stage::ListEnvironments => "list environments",
            Stage::BranchPolicies => "deployment branch policies",
            Stage::ProtectionRules => "custom protection rules",
            Stage::SecretCount => "secret count",
            Stage::VariableCount => "variable count",
            Stage::ListSecrets => "list secrets",
            Stage::ListVariables => "list variables",
            Stage::UpsertEnvironment => "upsert environment",
            Stage::CreateBranchPolicy => "create branch policy",
            Stage::CreateProtectionRule => "create protection rule",
            Stage::PublicKey => "fetch public key",
            Stage::Encrypt => "encrypt",
            Stage::PutSecret => "put secret",
            Stage::CreateVariable => "create variable",
            Stage::UpdateVariable => "update variable",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// `repo/env` or `repo/env/name`, or `line N` for rows that did not decode
    pub record: String,
    pub stage: Stage,
    pub error: String,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.record, self.stage, self.error)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    /// Named repositories left out under the skip policy
    pub skipped: Vec<String>,
    pub failures: Vec<RecordFailure>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_skip(&mut self, name: impl Into<String>) {
        self.skipped.push(name.into());
    }

    /// Log the failure and keep it for the final report
    pub fn record_failure(&mut self, record: impl Into<String>, stage: Stage, error: &Error) {
        let record = record.into();
        tracing::error!("{} failed for {}: {}", stage, record, error);
        self.failures.push(RecordFailure {
            record,
            stage,
            error: error.to_string(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Distinct records with at least one failure
    pub fn failed_records(&self) -> usize {
        let mut records: Vec<&str> = self.failures.iter().map(|f| f.record.as_str()).collect();
        records.sort_unstable();
        records.dedup();
        records.len()
    }

    /// Whether the process should exit successfully
    pub fn is_success(&self, allow_partial: bool) -> bool {
        allow_partial || !self.has_failures()
    }
}
