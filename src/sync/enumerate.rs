//! Repository acquisition: named lookups or cursor-paginated organization listing

use serde::{Deserialize, Serialize};

use super::RunSummary;
use crate::github::RepositoryAccess;
use crate::models::Repository;
use crate::Result;

/// What to do when a named repository cannot be resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingRepoPolicy {
    /// Log it, note it in the summary and carry on with the rest
    #[default]
    Skip,
    /// Fail the whole enumeration
    Abort,
}

/// Resolve `names` in order, or list the whole organization when empty
pub async fn repositories<R>(
    api: &R,
    owner: &str,
    names: &[String],
    policy: MissingRepoPolicy,
    summary: &mut RunSummary,
) -> Result<Vec<Repository>>
where
    R: RepositoryAccess + ?Sized,
{
    if names.is_empty() {
        organization_repositories(api, owner).await
    } else {
        named_repositories(api, owner, names, policy, summary).await
    }
}

pub async fn named_repositories<R>(
    api: &R,
    owner: &str,
    names: &[String],
    policy: MissingRepoPolicy,
    summary: &mut RunSummary,
) -> Result<Vec<Repository>>
where
    R: RepositoryAccess + ?Sized,
{
    let mut resolved = Vec::with_capacity(names.len());

    for name in names {
        tracing::debug!("Looking up repository {}/{}", owner, name);
        match api.repository(owner, name).await {
            Ok(repository) => resolved.push(repository),
            Err(e) if policy == MissingRepoPolicy::Skip => {
                tracing::warn!("Skipping repository {}/{}: {}", owner, name, e);
                summary.record_skip(name.as_str());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(resolved)
}

/// Follow `endCursor` until `hasNextPage` is false. Any failed page fails the
/// listing; a partial list is never returned.
pub async fn organization_repositories<R>(api: &R, owner: &str) -> Result<Vec<Repository>>
where
    R: RepositoryAccess + ?Sized,
{
    let mut repositories = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = api.repository_page(owner, cursor.as_deref()).await?;
        pages += 1;
        tracing::debug!(
            "Fetched page {} of {} repositories ({} so far)",
            pages,
            owner,
            repositories.len() + page.repositories.len()
        );
        repositories.extend(page.repositories);

        if !page.has_next_page {
            break;
        }
        match page.end_cursor {
            Some(next) => cursor = Some(next),
            None => {
                tracing::warn!("Page {} of {} has more results but no cursor", pages, owner);
                break;
            }
        }
    }

    tracing::info!("Found {} repositories in {}", repositories.len(), owner);
    Ok(repositories)
}
