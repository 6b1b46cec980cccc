//! Wire format of the GitHub REST and GraphQL responses and request bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    BranchPattern, CustomDeploymentRule, Environment, Repository, ReviewerKind, SecretMetadata,
    Variable,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentsResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub environments: Vec<ApiEnvironment>,
}

/// An environment as returned by `GET repos/{owner}/{repo}/environments`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEnvironment {
    pub name: String,
    #[serde(default)]
    pub can_admins_bypass: bool,
    #[serde(default)]
    pub protection_rules: Vec<ProtectionRule>,
    #[serde(default)]
    pub deployment_branch_policy: Option<BranchPolicyFlags>,
}

/// One entry of `protection_rules`; which fields are set depends on `kind`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProtectionRule {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub wait_timer: Option<u32>,
    #[serde(default)]
    pub prevent_self_review: Option<bool>,
    #[serde(default)]
    pub reviewers: Vec<ApiReviewer>,
}

/// `kind` stays a string so an unfamiliar reviewer type drops only that reviewer
#[derive(Debug, Clone, Deserialize)]
pub struct ApiReviewer {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub reviewer: ReviewerIdentity,
}

/// Users carry a `login`, teams a `slug`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewerIdentity {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl ReviewerIdentity {
    pub fn handle(&self) -> String {
        self.login
            .clone()
            .or_else(|| self.slug.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPolicyFlags {
    pub protected_branches: bool,
    pub custom_branch_policies: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchPoliciesResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub branch_policies: Vec<BranchPattern>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProtectionRulesResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub custom_deployment_protection_rules: Vec<ApiCustomRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCustomRule {
    pub id: u64,
    #[serde(default)]
    pub enabled: bool,
    pub app: ApiApp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiApp {
    pub id: u64,
    #[serde(default)]
    pub slug: String,
}

impl From<ApiCustomRule> for CustomDeploymentRule {
    fn from(rule: ApiCustomRule) -> Self {
        CustomDeploymentRule {
            policy_id: rule.id,
            enabled: rule.enabled,
            integration_id: rule.app.id,
            slug: rule.app.slug,
        }
    }
}

/// A `{ total_count, <items> }` page from a list endpoint
pub trait CountedPage: serde::de::DeserializeOwned {
    type Item;

    fn total_count(&self) -> u64;
    fn into_items(self) -> Vec<Self::Item>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretsResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub secrets: Vec<SecretMetadata>,
}

impl CountedPage for SecretsResponse {
    type Item = SecretMetadata;

    fn total_count(&self) -> u64 {
        self.total_count
    }

    fn into_items(self) -> Vec<SecretMetadata> {
        self.secrets
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariablesResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl CountedPage for VariablesResponse {
    type Item = Variable;

    fn total_count(&self) -> u64 {
        self.total_count
    }

    fn into_items(self) -> Vec<Variable> {
        self.variables
    }
}

/// Body of `PUT repos/{owner}/{repo}/environments/{env}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentSettings {
    pub wait_timer: u32,
    pub prevent_self_review: bool,
    pub reviewers: Vec<ReviewerRef>,
    /// `null` means any branch may deploy
    pub deployment_branch_policy: Option<BranchPolicyFlags>,
    pub can_admins_bypass: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewerRef {
    #[serde(rename = "type")]
    pub kind: ReviewerKind,
    pub id: u64,
}

impl From<&Environment> for EnvironmentSettings {
    fn from(env: &Environment) -> Self {
        EnvironmentSettings {
            wait_timer: env.wait_timer,
            prevent_self_review: env.prevent_self_review,
            reviewers: env
                .reviewers
                .iter()
                .map(|r| ReviewerRef {
                    kind: r.kind,
                    id: r.id,
                })
                .collect(),
            deployment_branch_policy: env.branch_policy.flags().map(
                |(protected_branches, custom_branch_policies)| BranchPolicyFlags {
                    protected_branches,
                    custom_branch_policies,
                },
            ),
            can_admins_bypass: env.admin_bypass,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateProtectionRule {
    pub integration_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableBody<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

// GraphQL

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryData {
    pub repository: Option<GqlRepository>,
}

#[derive(Debug, Deserialize)]
pub struct OrganizationData {
    pub organization: Option<GqlOrganization>,
}

#[derive(Debug, Deserialize)]
pub struct GqlOrganization {
    pub repositories: GqlRepositoryConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlRepositoryConnection {
    #[serde(default)]
    pub nodes: Vec<GqlRepository>,
    pub page_info: GqlPageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlPageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlRepository {
    pub database_id: u64,
    pub name: String,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<GqlRepository> for Repository {
    fn from(repo: GqlRepository) -> Self {
        Repository {
            id: repo.database_id,
            name: repo.name,
            visibility: repo.visibility,
            updated_at: repo.updated_at,
        }
    }
}
