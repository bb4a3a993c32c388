//! Per-repository resource collection.
//!
//! For each repository the audit needs five independent sub-resource
//! listings. Each one is fetched best-effort: a 404/403 answer (resource
//! disabled, or the token lacks scope) yields an empty list, while a rate
//! limit or transport failure aborts the whole traversal.

use std::future::Future;

use crate::client::GitHubClient;
use crate::error::Error;
use crate::models::{Branch, Collaborator, DeployKey, Hook, Team};
use crate::pagination::{walk, Page};

/// Everything the audit inspects about one repository.
#[derive(Debug, Clone, Default)]
pub struct RepoResources {
    pub teams: Vec<Team>,
    pub collaborators: Vec<Collaborator>,
    pub keys: Vec<DeployKey>,
    pub hooks: Vec<Hook>,
    pub branches: Vec<Branch>,
}

/// Drain a listing best-effort. `NotApplicable` on the first page means the
/// resource is unavailable for this repository and yields an empty list.
pub async fn best_effort<T, F, Fut>(fetch: F) -> Result<Vec<T>, Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, Error>>,
{
    match walk(fetch).await {
        Ok(items) => Ok(items),
        Err(Error::NotApplicable) => Ok(Vec::new()),
        Err(err) => Err(err),
    }
}

/// Fetch all five sub-resource listings for one repository, sequentially.
pub async fn fetch_resources(
    client: &GitHubClient,
    owner: &str,
    name: &str,
) -> Result<RepoResources, Error> {
    let teams = best_effort(|page| client.list_teams(owner, name, page)).await?;
    let collaborators = best_effort(|page| client.list_collaborators(owner, name, page)).await?;
    let keys = best_effort(|page| client.list_deploy_keys(owner, name, page)).await?;
    let hooks = best_effort(|page| client.list_hooks(owner, name, page)).await?;
    let branches = best_effort(|page| client.list_branches(owner, name, page)).await?;

    Ok(RepoResources {
        teams,
        collaborators,
        keys,
        hooks,
        branches,
    })
}

/// Partition branch names by protection state, confirmed per branch.
///
/// The bulk branch listing does not reliably carry the protection flag, so
/// every branch gets its own detail fetch. These fetches are strict; any
/// failure aborts.
pub async fn classify_branches(
    client: &GitHubClient,
    owner: &str,
    name: &str,
    branches: &[Branch],
) -> Result<(Vec<String>, Vec<String>), Error> {
    let mut protected = Vec::new();
    let mut unprotected = Vec::new();

    for branch in branches {
        let detail = client.get_branch(owner, name, &branch.name).await?;
        if detail.protected {
            protected.push(detail.name);
        } else {
            unprotected.push(detail.name);
        }
    }

    Ok((protected, unprotected))
}
