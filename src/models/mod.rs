//! Domain model for environments, secrets, variables and repositories
//!
//! These types carry the natural nested structure of the data. The flat CSV
//! representation lives exclusively in [`crate::codec`], and the wire format
//! of the GitHub API lives in [`crate::github::types`].

mod environment;
mod repository;
mod scoped;

pub use environment::{
    BranchPattern, CustomDeploymentRule, DeploymentBranchPolicy, Environment, EnvironmentImport,
    EnvironmentRecord, RefKind, Reviewer, ReviewerKind,
};
pub use repository::{Repository, RepositoryPage};
pub use scoped::{
    EncryptedSecret, EnvironmentPublicKey, ScopedEntry, SecretMetadata, SecretRecord, Variable,
    VariableRecord,
};
