//! The `protect` command: ensure the `master` branch of every in-scope
//! repository is protected, optionally requiring pull request reviews.
//!
//! Only the branch literally named `master` is inspected or touched; other
//! branches pass through untouched no matter what.

use async_trait::async_trait;

use crate::client::GitHubClient;
use crate::error::Error;
use crate::models::{ProtectionRequest, Repository};
use crate::reconcile::{decide_protection, Decision};
use crate::selector::RepoHandler;

const TARGET_BRANCH: &str = "master";

/// Handler for the `protect` command.
pub struct ProtectHandler {
    review: bool,
    dry_run: bool,
}

impl ProtectHandler {
    pub fn new(review: bool, dry_run: bool) -> Self {
        Self { review, dry_run }
    }
}

#[async_trait]
impl RepoHandler for ProtectHandler {
    async fn handle(&self, client: &GitHubClient, repo: &Repository) -> Result<(), Error> {
        let owner = &repo.owner.login;
        let name = &repo.name;

        let branches =
            match crate::pagination::walk(|page| client.list_branches(owner, name, page)).await {
                Ok(branches) => branches,
                Err(Error::NotApplicable) => return Ok(()),
                Err(err) => return Err(err),
            };

        if !branches.iter().any(|b| b.name == TARGET_BRANCH) {
            return Ok(());
        }

        // The bulk listing does not carry protection state.
        let branch = client.get_branch(owner, name, TARGET_BRANCH).await?;

        let required_reviews = if branch.protected && self.review {
            let protection = client
                .get_branch_protection(owner, name, TARGET_BRANCH)
                .await?;
            protection
                .required_pull_request_reviews
                .map(|r| r.required_approving_review_count)
        } else {
            None
        };

        match decide_protection(branch.protected, required_reviews, self.review) {
            Decision::NoOp => {
                if self.review {
                    println!(
                        "[OK] {}:{} is already protected and pull request reviews are required",
                        repo.full_name, TARGET_BRANCH
                    );
                } else {
                    println!(
                        "[OK] {}:{} is already protected",
                        repo.full_name, TARGET_BRANCH
                    );
                }
                Ok(())
            }
            Decision::Update if self.dry_run => {
                println!(
                    "[UPDATE] {}:{} will be changed to protected (require reviews: {})",
                    repo.full_name, TARGET_BRANCH, self.review
                );
                Ok(())
            }
            Decision::Update => {
                let request = ProtectionRequest::baseline(self.review);
                client
                    .update_branch_protection(owner, name, TARGET_BRANCH, &request)
                    .await?;
                println!("[OK] {}:{} is protected", repo.full_name, TARGET_BRANCH);
                Ok(())
            }
        }
    }
}
