//! The `collaborators` command: grant one login a permission tier on every
//! in-scope repository.

use async_trait::async_trait;
use tracing::debug;

use crate::client::GitHubClient;
use crate::correlate::{active_membership, correlate, Tier};
use crate::error::Error;
use crate::fetcher::best_effort;
use crate::models::Repository;
use crate::reconcile::{decide_collaborator, Decision, TierFlags};
use crate::selector::RepoHandler;

/// Handler for the `collaborators` command.
#[derive(Debug)]
pub struct CollaboratorsHandler {
    login: String,
    tier: Tier,
    dry_run: bool,
}

impl CollaboratorsHandler {
    /// Fails before any remote call when the login is empty or the tier
    /// flags do not select exactly one tier.
    pub fn new(login: &str, flags: TierFlags, dry_run: bool) -> Result<Self, Error> {
        if login.is_empty() {
            return Err(Error::InvalidArgument(
                "must pass a collaborator".to_string(),
            ));
        }
        Ok(Self {
            login: login.to_string(),
            tier: flags.selected_tier()?,
            dry_run,
        })
    }
}

#[async_trait]
impl RepoHandler for CollaboratorsHandler {
    async fn handle(&self, client: &GitHubClient, repo: &Repository) -> Result<(), Error> {
        let owner = &repo.owner.login;
        let name = &repo.name;

        let teams = best_effort(|page| client.list_teams(owner, name, page)).await?;
        let collaborators =
            best_effort(|page| client.list_collaborators(owner, name, page)).await?;

        let report = correlate(&collaborators, &teams, |id, login| async move {
            active_membership(client, id, &login).await
        })
        .await?;

        let already_at_tier = report
            .map(|r| r.contains(self.tier, &self.login))
            .unwrap_or(false);

        match decide_collaborator(already_at_tier) {
            Decision::NoOp => {
                println!(
                    "[OK] {} already has {} added as a collaborator ({})",
                    repo.full_name,
                    self.login,
                    self.tier.as_str()
                );
                return Ok(());
            }
            Decision::Update if self.dry_run => {
                println!(
                    "[UPDATE] {} will have {} added as a collaborator ({})",
                    repo.full_name,
                    self.login,
                    self.tier.as_str()
                );
                return Ok(());
            }
            Decision::Update => {}
        }

        match client
            .add_collaborator(owner, name, &self.login, self.tier.as_str())
            .await
        {
            Ok(()) => {
                println!(
                    "[OK] {} has {} added as a collaborator ({})",
                    repo.full_name,
                    self.login,
                    self.tier.as_str()
                );
                Ok(())
            }
            // The token may lack admin rights on this repository.
            Err(Error::NotApplicable) => {
                debug!(repo = %repo.full_name, "not allowed to add collaborator");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
