//! Repository selection and dispatch.
//!
//! Commands plug into the traversal through [`RepoHandler`]. The selector
//! resolves which repositories are in scope (a single `owner/name` target,
//! or the authenticated user's visible repositories filtered by owner) and
//! dispatches them one at a time, in listing order. A handler failure is
//! logged and the traversal continues, except for rate-limit exhaustion
//! which aborts the run.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::GitHubClient;
use crate::config::Config;
use crate::error::Error;
use crate::models::Repository;

/// Per-repository work performed by a command.
#[async_trait]
pub trait RepoHandler {
    async fn handle(&self, client: &GitHubClient, repo: &Repository) -> Result<(), Error>;
}

/// Resolve the in-scope repositories and run the handler over each.
pub async fn run(
    client: &GitHubClient,
    config: &Config,
    handler: &dyn RepoHandler,
) -> Result<(), Error> {
    if let Some(target) = &config.repo {
        let repo = resolve_single(client, target).await?;
        return handler.handle(client, &repo).await;
    }

    let mut affiliation = String::from("owner,collaborator");
    if !config.orgs.is_empty() {
        affiliation.push_str(",organization_member");
    }

    let mut allowed_owners = config.orgs.clone();
    if config.include_user {
        let user = client.current_user().await?;
        allowed_owners.push(user.login);
    }

    // Pages are dispatched as they arrive rather than buffered up front, so
    // a rate-limit abort loses as little progress as possible.
    let mut current = 1u32;
    loop {
        let page = client.list_visible_repos(&affiliation, current).await?;

        for repo in &page.items {
            if !allowed_owners.iter().any(|o| o == &repo.owner.login) {
                debug!(repo = %repo.full_name, "skipping out-of-scope owner");
                continue;
            }
            if let Err(err) = handler.handle(client, repo).await {
                if err.is_fatal() {
                    return Err(err);
                }
                warn!(repo = %repo.full_name, error = %err, "skipping repository");
            }
        }

        match page.advance(current) {
            Some(next) => current = next,
            None => break,
        }
    }

    Ok(())
}

/// Resolve an `owner/name` target through repository search.
async fn resolve_single(client: &GitHubClient, target: &str) -> Result<Repository, Error> {
    let (owner, name) = target
        .split_once('/')
        .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
        .ok_or_else(|| {
            Error::InvalidArgument(format!("repository must be given as owner/name: {target}"))
        })?;

    client.search_top_repository(owner, name).await
}
