//! Desired-versus-observed reconciliation decisions.
//!
//! Every mutating command runs through the same two-phase shape: compare
//! the desired state against what the API reports, produce a [`Decision`],
//! and only then (outside dry-run) issue the mutation. The comparison logic
//! lives here, free of any HTTP, so it can be tested directly.

use crate::correlate::Tier;
use crate::error::Error;
use crate::models::Repository;

/// Outcome of comparing desired state against observed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Observed state already satisfies the desired state.
    NoOp,
    /// A mutation is required to reach the desired state.
    Update,
}

/// The three mutually exclusive tier flags a grant command accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TierFlags {
    pub admin: bool,
    pub push: bool,
    pub pull: bool,
}

impl TierFlags {
    /// The single tier selected by the flags. Exactly one must be set.
    pub fn selected_tier(&self) -> Result<Tier, Error> {
        match (self.admin, self.push, self.pull) {
            (true, false, false) => Ok(Tier::Admin),
            (false, true, false) => Ok(Tier::Push),
            (false, false, true) => Ok(Tier::Pull),
            _ => Err(Error::InvalidArgument(
                "exactly one of --admin, --push, --pull must be set".to_string(),
            )),
        }
    }
}

/// Whether a collaborator grant is needed. `already_at_tier` is true when
/// the login already holds the desired tier on the repository.
pub fn decide_collaborator(already_at_tier: bool) -> Decision {
    if already_at_tier {
        Decision::NoOp
    } else {
        Decision::Update
    }
}

/// Merge-method configuration of a repository, desired or observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeMethods {
    pub commits: bool,
    pub squash: bool,
    pub rebase: bool,
}

impl MergeMethods {
    /// Observed merge methods from a single-repo get. Flags absent from the
    /// response count as disabled.
    pub fn observed(repo: &Repository) -> Self {
        Self {
            commits: repo.allow_merge_commit.unwrap_or(false),
            squash: repo.allow_squash_merge.unwrap_or(false),
            rebase: repo.allow_rebase_merge.unwrap_or(false),
        }
    }

    /// Labels of the enabled methods, in fixed order.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.commits {
            labels.push("mergeCommit");
        }
        if self.squash {
            labels.push("squash");
        }
        if self.rebase {
            labels.push("rebase");
        }
        labels
    }
}

/// Whether the observed merge configuration matches the desired one.
pub fn decide_merge(desired: MergeMethods, observed: MergeMethods) -> Decision {
    if desired == observed {
        Decision::NoOp
    } else {
        Decision::Update
    }
}

/// Whether a branch needs a protection update.
///
/// An unprotected branch always needs one. A protected branch needs one
/// only when a review is wanted and the observed required-review count is
/// zero; extra observed strictness is never relaxed.
pub fn decide_protection(
    protected: bool,
    required_reviews: Option<u32>,
    want_review: bool,
) -> Decision {
    if !protected {
        return Decision::Update;
    }
    if want_review && required_reviews.unwrap_or(0) == 0 {
        return Decision::Update;
    }
    Decision::NoOp
}
