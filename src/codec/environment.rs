use csv::StringRecord;

use super::{Row, SubItem, decode_items, encode_items};
use crate::Result;
use crate::models::{
    BranchPattern, CustomDeploymentRule, DeploymentBranchPolicy, Environment, EnvironmentImport,
    EnvironmentRecord, Reviewer,
};

pub const ENVIRONMENT_EXPORT_HEADER: [&str; 12] = [
    "RepositoryName",
    "RepositoryID",
    "EnvironmentName",
    "AdminBypass",
    "WaitTimer",
    "Reviewers",
    "PreventSelfReview",
    "BranchPolicyType",
    "Branches",
    "CustomDeploymentProtectionPolicy",
    "SecretsTotalCount",
    "VariablesTotalCount",
];

/// The export layout without the two count columns
pub const ENVIRONMENT_IMPORT_HEADER: [&str; 10] = [
    "RepositoryName",
    "RepositoryID",
    "EnvironmentName",
    "AdminBypass",
    "WaitTimer",
    "Reviewers",
    "PreventSelfReview",
    "BranchPolicyType",
    "Branches",
    "CustomDeploymentProtectionPolicy",
];

const POLICY_CUSTOM: &str = "custom";
const POLICY_PROTECTED: &str = "protected";

impl SubItem for Reviewer {
    const KIND: &'static str = "reviewer";
    const ARITY: usize = 3;

    fn fields(&self) -> Vec<String> {
        vec![
            self.kind.to_string(),
            self.login.clone(),
            self.id.to_string(),
        ]
    }

    fn from_fields(fields: &[&str]) -> std::result::Result<Self, String> {
        Ok(Reviewer {
            kind: fields[0].trim().parse()?,
            login: fields[1].to_string(),
            id: fields[2]
                .trim()
                .parse()
                .map_err(|_| format!("reviewer id {:?} is not a number", fields[2]))?,
        })
    }
}

impl SubItem for BranchPattern {
    const KIND: &'static str = "branch pattern";
    const ARITY: usize = 2;

    fn fields(&self) -> Vec<String> {
        vec![self.name.clone(), self.kind.as_str().to_string()]
    }

    fn from_fields(fields: &[&str]) -> std::result::Result<Self, String> {
        Ok(BranchPattern {
            name: fields[0].to_string(),
            kind: fields[1].trim().parse()?,
        })
    }
}

impl SubItem for CustomDeploymentRule {
    const KIND: &'static str = "custom deployment rule";
    const ARITY: usize = 4;

    fn fields(&self) -> Vec<String> {
        vec![
            self.policy_id.to_string(),
            self.enabled.to_string(),
            self.integration_id.to_string(),
            self.slug.clone(),
        ]
    }

    fn from_fields(fields: &[&str]) -> std::result::Result<Self, String> {
        Ok(CustomDeploymentRule {
            policy_id: fields[0]
                .trim()
                .parse()
                .map_err(|_| format!("policy id {:?} is not a number", fields[0]))?,
            enabled: fields[1]
                .trim()
                .parse()
                .map_err(|_| format!("enabled flag {:?} is not true/false", fields[1]))?,
            integration_id: fields[2]
                .trim()
                .parse()
                .map_err(|_| format!("integration id {:?} is not a number", fields[2]))?,
            slug: fields[3].to_string(),
        })
    }
}

fn encode_policy(policy: DeploymentBranchPolicy) -> &'static str {
    match policy {
        DeploymentBranchPolicy::Unrestricted => "",
        DeploymentBranchPolicy::ProtectedBranches => POLICY_PROTECTED,
        DeploymentBranchPolicy::CustomBranches => POLICY_CUSTOM,
    }
}

/// Flatten one environment record into the export column layout
pub fn encode_environment_record(record: &EnvironmentRecord) -> Vec<String> {
    let env = &record.environment;
    vec![
        record.repository.name.clone(),
        record.repository.id.to_string(),
        env.name.clone(),
        env.admin_bypass.to_string(),
        env.wait_timer.to_string(),
        encode_items(&env.reviewers),
        env.prevent_self_review.to_string(),
        encode_policy(env.branch_policy).to_string(),
        encode_items(&env.branches),
        encode_items(&env.custom_rules),
        record.secrets_total.to_string(),
        record.variables_total.to_string(),
    ]
}

/// Decode one environment row.
///
/// Accepts the import layout and the export layout (the trailing count
/// columns are ignored). Files written before the custom deployment rule
/// column existed are also accepted.
pub fn decode_environment_row(record: &StringRecord) -> Result<EnvironmentImport> {
    let row = Row::new(record);

    let repository_name = row.non_empty(0, "RepositoryName")?.to_string();
    let repository_id = row.required_u64(1, "RepositoryID")?;
    let name = row.non_empty(2, "EnvironmentName")?.to_string();
    let context = format!("{repository_name}/{name} (line {})", row.line());

    let branch_policy = match row.cell(7, "BranchPolicyType")?.trim() {
        "" => DeploymentBranchPolicy::Unrestricted,
        POLICY_PROTECTED => DeploymentBranchPolicy::ProtectedBranches,
        POLICY_CUSTOM => DeploymentBranchPolicy::CustomBranches,
        other => return Err(row.reject("BranchPolicyType", other)),
    };

    let environment = Environment {
        admin_bypass: row.flag(3, "AdminBypass")?,
        wait_timer: row.u32_or_zero(4, "WaitTimer")?,
        reviewers: decode_items(row.cell(5, "Reviewers")?, &context),
        prevent_self_review: row.flag(6, "PreventSelfReview")?,
        branch_policy,
        branches: decode_items(row.cell(8, "Branches")?, &context),
        custom_rules: decode_items(row.optional_cell(9), &context),
        name,
    };

    Ok(EnvironmentImport {
        repository_name,
        repository_id,
        environment,
    })
}
