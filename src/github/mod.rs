//! GitHub API access
//!
//! The API surface is split into four capability traits so that each part of
//! the sync pipeline depends only on what it uses and can be exercised against
//! an in-memory fake. [`GitHubClient`] implements all four over HTTP.

use async_trait::async_trait;

use crate::Result;
use crate::models::{
    BranchPattern, CustomDeploymentRule, EncryptedSecret, EnvironmentPublicKey, Repository,
    RepositoryPage, SecretMetadata, Variable,
};

mod client;
pub mod types;

pub use client::{Endpoints, GitHubClient};
pub use types::{ApiEnvironment, EnvironmentSettings};

/// Items of a list endpoint together with the total the remote reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub total_count: u64,
    pub items: Vec<T>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            total_count: 0,
            items: Vec::new(),
        }
    }
}

#[async_trait]
pub trait RepositoryAccess: Send + Sync {
    /// Look up one repository; [`crate::Error::RepoNotFound`] when absent
    async fn repository(&self, owner: &str, name: &str) -> Result<Repository>;

    /// Fetch the organization's repositories that follow `after`
    async fn repository_page(&self, owner: &str, after: Option<&str>) -> Result<RepositoryPage>;
}

#[async_trait]
pub trait EnvironmentAccess: Send + Sync {
    async fn environments(&self, owner: &str, repo: &str) -> Result<Vec<ApiEnvironment>>;

    async fn branch_policies(&self, owner: &str, repo: &str, env: &str)
    -> Result<Vec<BranchPattern>>;

    async fn custom_protection_rules(
        &self,
        owner: &str,
        repo: &str,
        env: &str,
    ) -> Result<Vec<CustomDeploymentRule>>;

    /// Create or update an environment. Idempotent.
    async fn upsert_environment(
        &self,
        owner: &str,
        repo: &str,
        env: &str,
        settings: &EnvironmentSettings,
    ) -> Result<()>;

    async fn create_branch_policy(
        &self,
        owner: &str,
        repo: &str,
        env: &str,
        pattern: &BranchPattern,
    ) -> Result<()>;

    async fn create_protection_rule(
        &self,
        owner: &str,
        repo: &str,
        env: &str,
        integration_id: u64,
    ) -> Result<()>;
}

#[async_trait]
pub trait SecretAccess: Send + Sync {
    async fn secret_count(&self, repo_id: u64, env: &str) -> Result<u64>;

    async fn secrets(&self, repo_id: u64, env: &str) -> Result<Listing<SecretMetadata>>;

    /// The environment's current sealing key; never cache it
    async fn public_key(&self, repo_id: u64, env: &str) -> Result<EnvironmentPublicKey>;

    async fn put_secret(
        &self,
        repo_id: u64,
        env: &str,
        name: &str,
        secret: &EncryptedSecret,
    ) -> Result<()>;
}

#[async_trait]
pub trait VariableAccess: Send + Sync {
    async fn variable_count(&self, repo_id: u64, env: &str) -> Result<u64>;

    async fn variables(&self, repo_id: u64, env: &str) -> Result<Listing<Variable>>;

    /// Fails with HTTP 409 when the variable already exists
    async fn create_variable(&self, repo_id: u64, env: &str, name: &str, value: &str)
    -> Result<()>;

    async fn update_variable(&self, repo_id: u64, env: &str, name: &str, value: &str)
    -> Result<()>;
}
