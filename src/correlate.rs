//! Permission correlation between collaborators and teams.
//!
//! For every collaborator the highest permission tier is derived from the
//! raw permission booleans, then each repository team is checked for active
//! membership. A collaborator is attributed to the teams whose own
//! permission level equals the collaborator's tier; the rule is applied
//! uniformly across all three tiers.

use std::future::Future;

use serde::Serialize;

use crate::client::GitHubClient;
use crate::error::Error;
use crate::models::{Collaborator, Permissions, Team};

/// The three-level permission ranking used for both collaborators and teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Admin,
    Push,
    Pull,
}

impl Tier {
    /// The permission string GitHub uses for this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Admin => "admin",
            Tier::Push => "push",
            Tier::Pull => "pull",
        }
    }

    /// Highest tier granted by a raw permission map, if any.
    pub fn from_permissions(perms: &Permissions) -> Option<Tier> {
        if perms.admin {
            Some(Tier::Admin)
        } else if perms.push {
            Some(Tier::Push)
        } else if perms.pull {
            Some(Tier::Pull)
        } else {
            None
        }
    }
}

/// A collaborator annotated with the teams granting their tier.
#[derive(Debug, Clone, Serialize)]
pub struct AttributedCollaborator {
    pub login: String,
    pub teams: Vec<String>,
}

/// Collaborators bucketed by permission tier.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorReport {
    pub total_count: usize,
    pub admin: Vec<AttributedCollaborator>,
    pub write: Vec<AttributedCollaborator>,
    pub read: Vec<AttributedCollaborator>,
}

impl CollaboratorReport {
    fn bucket_mut(&mut self, tier: Tier) -> &mut Vec<AttributedCollaborator> {
        match tier {
            Tier::Admin => &mut self.admin,
            Tier::Push => &mut self.write,
            Tier::Pull => &mut self.read,
        }
    }

    /// Whether a login sits in the bucket for the given tier.
    pub fn contains(&self, tier: Tier, login: &str) -> bool {
        let bucket = match tier {
            Tier::Admin => &self.admin,
            Tier::Push => &self.write,
            Tier::Pull => &self.read,
        };
        bucket.iter().any(|c| c.login == login)
    }
}

/// Correlate collaborators against teams.
///
/// Repositories with a single collaborator (the owner alone) are skipped
/// entirely and yield `None`. `is_active_member` answers whether a login is
/// an *active* member of a team; pending invitations must answer `false`.
pub async fn correlate<F, Fut>(
    collaborators: &[Collaborator],
    teams: &[Team],
    mut is_active_member: F,
) -> Result<Option<CollaboratorReport>, Error>
where
    F: FnMut(u64, String) -> Fut,
    Fut: Future<Output = Result<bool, Error>>,
{
    if collaborators.len() <= 1 {
        return Ok(None);
    }

    let mut report = CollaboratorReport {
        total_count: collaborators.len(),
        ..Default::default()
    };

    for collaborator in collaborators {
        let Some(tier) = Tier::from_permissions(&collaborator.permissions) else {
            continue;
        };

        let mut attributed_teams = Vec::new();
        for team in teams {
            if team.permission != tier.as_str() {
                continue;
            }
            if is_active_member(team.id, collaborator.login.clone()).await? {
                attributed_teams.push(team.name.clone());
            }
        }

        report.bucket_mut(tier).push(AttributedCollaborator {
            login: collaborator.login.clone(),
            teams: attributed_teams,
        });
    }

    Ok(Some(report))
}

/// Active-membership lookup backed by the API. A 404/403 membership answer
/// means "not a member", never an error.
pub async fn active_membership(
    client: &GitHubClient,
    team_id: u64,
    login: &str,
) -> Result<bool, Error> {
    match client.get_team_membership(team_id, login).await {
        Ok(membership) => Ok(membership.is_active()),
        Err(Error::NotApplicable) => Ok(false),
        Err(err) => Err(err),
    }
}
