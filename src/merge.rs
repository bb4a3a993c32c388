//! The `merge` command: report repositories whose allowed merge methods
//! differ from the desired set.
//!
//! This command is report-only. The REST API has no endpoint to change the
//! merge-method flags from here, so the decision is computed and printed
//! but never applied.

use async_trait::async_trait;

use crate::client::GitHubClient;
use crate::error::Error;
use crate::models::Repository;
use crate::reconcile::{decide_merge, Decision, MergeMethods};
use crate::selector::RepoHandler;

/// Handler for the `merge` command.
#[derive(Debug)]
pub struct MergeHandler {
    desired: MergeMethods,
}

impl MergeHandler {
    /// Fails before any remote call when no method is selected.
    pub fn new(desired: MergeMethods) -> Result<Self, Error> {
        if !desired.commits && !desired.squash && !desired.rebase {
            return Err(Error::InvalidArgument(
                "you must choose from commits, squash, and/or rebase".to_string(),
            ));
        }
        Ok(Self { desired })
    }

    fn desired_label(&self) -> String {
        let mut labels = Vec::new();
        if self.desired.commits {
            labels.push("mergeCommits");
        }
        if self.desired.squash {
            labels.push("squash");
        }
        if self.desired.rebase {
            labels.push("rebase");
        }
        labels.join(" | ")
    }
}

#[async_trait]
impl RepoHandler for MergeHandler {
    async fn handle(&self, client: &GitHubClient, repo: &Repository) -> Result<(), Error> {
        // The listing omits the merge flags; a fresh get carries them.
        let detail = match client.get_repository(&repo.owner.login, &repo.name).await {
            Ok(detail) => detail,
            Err(Error::NotApplicable) => return Ok(()),
            Err(err) => return Err(err),
        };

        match decide_merge(self.desired, MergeMethods::observed(&detail)) {
            Decision::NoOp => {
                println!(
                    "[OK] {} is already set to {}",
                    repo.full_name,
                    self.desired_label()
                );
            }
            Decision::Update => {
                println!(
                    "[UPDATE] {} will be changed to {}",
                    repo.full_name,
                    self.desired_label()
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn rejects_empty_method_set() {
        let desired = MergeMethods {
            commits: false,
            squash: false,
            rebase: false,
        };
        assert_matches!(MergeHandler::new(desired), Err(Error::InvalidArgument(_)));
    }

    #[test]
    fn desired_label_joins_selected_methods() {
        let handler = MergeHandler::new(MergeMethods {
            commits: true,
            squash: true,
            rebase: false,
        })
        .unwrap();
        assert_eq!(handler.desired_label(), "mergeCommits | squash");
    }
}
