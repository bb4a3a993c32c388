//! Value types for the GitHub REST API.
//!
//! Every entity here is an immutable snapshot for the duration of one
//! repository's processing; nothing is cached across repositories.

use serde::{Deserialize, Serialize};

/// A user or organization account, reduced to its login.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
}

/// A repository as returned by the listing and get endpoints.
///
/// The `allow_*` merge-method flags are only populated by the single-repo
/// get endpoint; listing endpoints omit them.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: Account,
    #[serde(default)]
    pub allow_merge_commit: Option<bool>,
    #[serde(default)]
    pub allow_squash_merge: Option<bool>,
    #[serde(default)]
    pub allow_rebase_merge: Option<bool>,
}

/// A team granted access to a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: u64,
    pub name: String,
    /// One of `admin`, `push`, `pull`.
    #[serde(default)]
    pub permission: String,
}

/// Raw permission booleans attached to a collaborator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

/// A direct or team-derived collaborator on a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Collaborator {
    pub login: String,
    #[serde(default)]
    pub permissions: Permissions,
}

/// A deploy key attached to a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployKey {
    pub title: String,
    #[serde(default)]
    pub read_only: bool,
    pub url: String,
}

/// A webhook configured on a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Hook {
    pub name: String,
    #[serde(default)]
    pub active: bool,
    pub url: String,
}

/// A branch. The bulk listing endpoint does not carry protection state;
/// only the per-branch detail fetch populates `protected` reliably.
#[derive(Debug, Clone, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub protected: bool,
}

/// Branch protection detail.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchProtection {
    #[serde(default)]
    pub required_pull_request_reviews: Option<RequiredReviews>,
}

/// Required pull-request-review settings on a protected branch.
#[derive(Debug, Clone, Deserialize)]
pub struct RequiredReviews {
    #[serde(default)]
    pub required_approving_review_count: u32,
}

/// The membership state of a user in a team. Only `active` counts;
/// `pending` invitations do not.
#[derive(Debug, Clone, Deserialize)]
pub struct Membership {
    pub state: String,
}

impl Membership {
    pub fn is_active(&self) -> bool {
        self.state == "active"
    }
}

/// A release with its binary assets.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A single uploaded release asset.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Envelope returned by the repository search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults<T> {
    pub total_count: u64,
    pub items: Vec<T>,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body for the update-branch-protection call. The baseline is a non-strict,
/// empty-context status check requirement with no push restrictions.
#[derive(Debug, Clone, Serialize)]
pub struct ProtectionRequest {
    pub required_status_checks: RequiredStatusChecks,
    pub enforce_admins: bool,
    pub required_pull_request_reviews: Option<ReviewRequirement>,
    pub restrictions: Option<()>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequiredStatusChecks {
    pub strict: bool,
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequirement {
    pub required_approving_review_count: u32,
}

impl ProtectionRequest {
    /// The fixed protection baseline, optionally requiring one approving
    /// review.
    pub fn baseline(require_review: bool) -> Self {
        Self {
            required_status_checks: RequiredStatusChecks {
                strict: false,
                contexts: Vec::new(),
            },
            enforce_admins: false,
            required_pull_request_reviews: require_review.then_some(ReviewRequirement {
                required_approving_review_count: 1,
            }),
            restrictions: None,
        }
    }
}

/// Body for the add-collaborator call.
#[derive(Debug, Clone, Serialize)]
pub struct CollaboratorInvite {
    pub permission: String,
}

/// Body for the edit-release call.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseEdit {
    pub name: String,
    pub body: String,
}
