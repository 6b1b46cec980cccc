//! Per-repository environment aggregation
//!
//! Each environment is assembled from several endpoints. Every sub-resource
//! is fetched best-effort: a failure is logged and recorded against the
//! environment, and the record is still emitted with whatever was gathered.

use super::{RunSummary, Stage};
use crate::github::{ApiEnvironment, EnvironmentAccess, SecretAccess, VariableAccess};
use crate::models::{
    DeploymentBranchPolicy, Environment, EnvironmentRecord, Repository, Reviewer, ReviewerKind,
};
use crate::{Error, Result};

const WAIT_TIMER_RULE: &str = "wait_timer";
const REQUIRED_REVIEWERS_RULE: &str = "required_reviewers";
const BRANCH_POLICY_RULE: &str = "branch_policy";

/// Build the domain environment from the API shape.
///
/// Protection rules are classified by their type tag. Unknown tags are
/// ignored and a repeated tag overwrites the earlier one.
pub fn environment_from_api(api_env: ApiEnvironment) -> Environment {
    let mut environment = Environment::named(api_env.name);
    environment.admin_bypass = api_env.can_admins_bypass;

    for rule in api_env.protection_rules {
        match rule.kind.as_str() {
            WAIT_TIMER_RULE => environment.wait_timer = rule.wait_timer.unwrap_or(0),
            REQUIRED_REVIEWERS_RULE => {
                environment.prevent_self_review = rule.prevent_self_review.unwrap_or(false);
                environment.reviewers = rule
                    .reviewers
                    .into_iter()
                    .filter_map(|r| match r.kind.parse::<ReviewerKind>() {
                        Ok(kind) => Some(Reviewer {
                            kind,
                            login: r.reviewer.handle(),
                            id: r.reviewer.id,
                        }),
                        Err(reason) => {
                            tracing::warn!(
                                "Skipping reviewer {} on {}: {}",
                                r.reviewer.handle(),
                                environment.name,
                                reason
                            );
                            None
                        }
                    })
                    .collect();
            }
            // The flags themselves live on `deployment_branch_policy`
            BRANCH_POLICY_RULE => {}
            other => tracing::trace!(
                "Ignoring protection rule {} on {}",
                other,
                environment.name
            ),
        }
    }

    environment.branch_policy = api_env
        .deployment_branch_policy
        .map(|flags| {
            DeploymentBranchPolicy::from_flags(
                flags.protected_branches,
                flags.custom_branch_policies,
            )
        })
        .unwrap_or_default();

    environment
}

/// Fetch a repository's environments, recording a failure as an empty list
pub async fn environments_of<A>(
    api: &A,
    owner: &str,
    repository: &Repository,
    summary: &mut RunSummary,
) -> Vec<ApiEnvironment>
where
    A: EnvironmentAccess + ?Sized,
{
    tracing::debug!("Gathering environments for {}", repository.name);
    match api.environments(owner, &repository.name).await {
        Ok(environments) => environments,
        Err(e) => {
            summary.record_failure(repository.name.as_str(), Stage::ListEnvironments, &e);
            Vec::new()
        }
    }
}

/// Treat a 404 as an empty value, passing anything else through
pub(crate) fn absent_as_default<T: Default>(result: Result<T>) -> Result<T> {
    match result {
        Err(Error::NotFound { .. }) => Ok(T::default()),
        other => other,
    }
}

/// Aggregate every environment of `repository`, handing each finished record
/// to `sink` as soon as it is complete. Only a sink failure is returned.
pub async fn aggregate_repository<A, F>(
    api: &A,
    owner: &str,
    repository: &Repository,
    summary: &mut RunSummary,
    sink: &mut F,
) -> Result<()>
where
    A: EnvironmentAccess + SecretAccess + VariableAccess + ?Sized,
    F: FnMut(EnvironmentRecord) -> Result<()>,
{
    let environments = environments_of(api, owner, repository, summary).await;
    tracing::debug!(
        "Aggregating {} environment(s) for {}",
        environments.len(),
        repository.name
    );

    for api_env in environments {
        let record = aggregate_environment(api, owner, repository, api_env, summary).await;
        sink(record)?;
        summary.record_success();
    }

    Ok(())
}

async fn aggregate_environment<A>(
    api: &A,
    owner: &str,
    repository: &Repository,
    api_env: ApiEnvironment,
    summary: &mut RunSummary,
) -> EnvironmentRecord
where
    A: EnvironmentAccess + SecretAccess + VariableAccess + ?Sized,
{
    let mut environment = environment_from_api(api_env);
    let label = format!("{}/{}", repository.name, environment.name);

    if environment.branch_policy.is_custom() {
        tracing::debug!("Gathering branch policies for {}", label);
        match api
            .branch_policies(owner, &repository.name, &environment.name)
            .await
        {
            Ok(branches) => environment.branches = branches,
            Err(e) => summary.record_failure(label.as_str(), Stage::BranchPolicies, &e),
        }
    }

    tracing::debug!("Gathering custom protection rules for {}", label);
    match absent_as_default(
        api.custom_protection_rules(owner, &repository.name, &environment.name)
            .await,
    ) {
        Ok(rules) => environment.custom_rules = rules,
        Err(e) => summary.record_failure(label.as_str(), Stage::ProtectionRules, &e),
    }

    let secrets_total = match absent_as_default(
        api.secret_count(repository.id, &environment.name).await,
    ) {
        Ok(total) => total,
        Err(e) => {
            summary.record_failure(label.as_str(), Stage::SecretCount, &e);
            0
        }
    };

    let variables_total = match absent_as_default(
        api.variable_count(repository.id, &environment.name).await,
    ) {
        Ok(total) => total,
        Err(e) => {
            summary.record_failure(label.as_str(), Stage::VariableCount, &e);
            0
        }
    };

    EnvironmentRecord {
        repository: repository.clone(),
        environment,
        secrets_total,
        variables_total,
    }
}

