use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Repository;

/// A deployment environment within one repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub name: String,
    pub admin_bypass: bool,
    /// Seconds to wait before a deployment may proceed
    pub wait_timer: u32,
    pub prevent_self_review: bool,
    pub reviewers: Vec<Reviewer>,
    pub branch_policy: DeploymentBranchPolicy,
    /// Only meaningful when `branch_policy` is [`DeploymentBranchPolicy::CustomBranches`]
    pub branches: Vec<BranchPattern>,
    pub custom_rules: Vec<CustomDeploymentRule>,
}

impl Environment {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewerKind {
    Team,
    User,
}

impl ReviewerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewerKind::Team => "Team",
            ReviewerKind::User => "User",
        }
    }
}

impl fmt::Display for ReviewerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Team" => Ok(ReviewerKind::Team),
            "User" => Ok(ReviewerKind::User),
            other => Err(format!("unknown reviewer type {other:?}")),
        }
    }
}

/// A required reviewer. `login` holds the user login, or the slug for a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reviewer {
    pub kind: ReviewerKind,
    pub login: String,
    pub id: u64,
}

/// Which branches and tags may deploy to an environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeploymentBranchPolicy {
    /// Any branch may deploy
    #[default]
    Unrestricted,
    /// Only branches with branch protection rules
    ProtectedBranches,
    /// Only branches and tags matching the environment's named patterns
    CustomBranches,
}

impl DeploymentBranchPolicy {
    /// Build from the pair of flags the environments API returns
    pub fn from_flags(protected_branches: bool, custom_branch_policies: bool) -> Self {
        if custom_branch_policies {
            DeploymentBranchPolicy::CustomBranches
        } else if protected_branches {
            DeploymentBranchPolicy::ProtectedBranches
        } else {
            DeploymentBranchPolicy::Unrestricted
        }
    }

    /// The (protected_branches, custom_branch_policies) flags, or `None` when unrestricted
    pub fn flags(&self) -> Option<(bool, bool)> {
        match self {
            DeploymentBranchPolicy::Unrestricted => None,
            DeploymentBranchPolicy::ProtectedBranches => Some((true, false)),
            DeploymentBranchPolicy::CustomBranches => Some((false, true)),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, DeploymentBranchPolicy::CustomBranches)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    #[default]
    Branch,
    Tag,
}

impl RefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefKind::Branch => "branch",
            RefKind::Tag => "tag",
        }
    }
}

impl FromStr for RefKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "branch" => Ok(RefKind::Branch),
            "tag" => Ok(RefKind::Tag),
            other => Err(format!("unknown ref type {other:?}")),
        }
    }
}

/// A named branch or tag pattern allowed to deploy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPattern {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: RefKind,
}

impl BranchPattern {
    pub fn branch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::Branch,
        }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::Tag,
        }
    }
}

/// A GitHub App gating deployments to an environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomDeploymentRule {
    pub policy_id: u64,
    pub enabled: bool,
    pub integration_id: u64,
    pub slug: String,
}

/// One exported environment, denormalized with its repository and counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentRecord {
    pub repository: Repository,
    pub environment: Environment,
    pub secrets_total: u64,
    pub variables_total: u64,
}

/// One environment decoded from an import file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentImport {
    pub repository_name: String,
    pub repository_id: u64,
    pub environment: Environment,
}

impl EnvironmentImport {
    pub fn label(&self) -> String {
        format!("{}/{}", self.repository_name, self.environment.name)
    }
}
