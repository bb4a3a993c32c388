//! The `audit` command: one report record per repository.

use async_trait::async_trait;
use serde::Serialize;

use crate::client::GitHubClient;
use crate::correlate::{active_membership, correlate, CollaboratorReport};
use crate::error::Error;
use crate::fetcher::{classify_branches, fetch_resources};
use crate::models::Repository;
use crate::reconcile::MergeMethods;
use crate::selector::RepoHandler;

/// Everything reported about one repository.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub name: String,
    pub collaborators: CollaboratorReport,
    pub deploy_keys: Vec<KeyRecord>,
    pub hooks: Vec<HookRecord>,
    pub protected_branches: Vec<String>,
    pub unprotected_branches: Vec<String>,
    pub merge_methods: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    pub title: String,
    pub read_only: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HookRecord {
    pub name: String,
    pub active: bool,
    pub url: String,
}

/// Render the human-readable block for one record. Collaborators are shown
/// only when there is more than one; team attribution is shown for the
/// admin bucket only, matching the JSON shape minus the noise.
pub fn render_text(record: &AuditRecord) -> String {
    let mut out = format!("{} -> \n", record.name);

    if record.collaborators.total_count > 1 {
        let admin: Vec<String> = record
            .collaborators
            .admin
            .iter()
            .map(|c| format!("\t\t\t{} (teams: {})", c.login, c.teams.join(", ")))
            .collect();
        let write: Vec<String> = record
            .collaborators
            .write
            .iter()
            .map(|c| format!("\t\t\t{}", c.login))
            .collect();
        let read: Vec<String> = record
            .collaborators
            .read
            .iter()
            .map(|c| format!("\t\t\t{}", c.login))
            .collect();

        out += &format!("\tCollaborators ({}):\n", record.collaborators.total_count);
        out += &format!("\t\tAdmin ({}):\n{}\n", admin.len(), admin.join("\n"));
        out += &format!("\t\tWrite ({}):\n{}\n", write.len(), write.join("\n"));
        out += &format!("\t\tRead ({}):\n{}\n", read.len(), read.join("\n"));
    }

    if !record.deploy_keys.is_empty() {
        let keys: Vec<String> = record
            .deploy_keys
            .iter()
            .map(|k| format!("\t\t{} - ro:{} ({})", k.title, k.read_only, k.url))
            .collect();
        out += &format!("\tKeys ({}):\n{}\n", keys.len(), keys.join("\n"));
    }

    if !record.hooks.is_empty() {
        let hooks: Vec<String> = record
            .hooks
            .iter()
            .map(|h| format!("\t\t{} - active:{} ({})", h.name, h.active, h.url))
            .collect();
        out += &format!("\tHooks ({}):\n{}\n", hooks.len(), hooks.join("\n"));
    }

    if !record.protected_branches.is_empty() {
        out += &format!(
            "\tProtected Branches ({}): {}\n",
            record.protected_branches.len(),
            record.protected_branches.join(", ")
        );
    }

    if !record.unprotected_branches.is_empty() {
        out += &format!(
            "\tUnprotected Branches ({}): {}\n",
            record.unprotected_branches.len(),
            record.unprotected_branches.join(", ")
        );
    }

    out += &format!("\tMerge Methods: {}\n", record.merge_methods.join(" "));
    out += "--\n\n";
    out
}

/// Handler for the `audit` command.
pub struct AuditHandler {
    json: bool,
}

impl AuditHandler {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Assemble the report record for one repository, or `None` when there
    /// is nothing worth reporting.
    pub async fn build_record(
        &self,
        client: &GitHubClient,
        repo: &Repository,
    ) -> Result<Option<AuditRecord>, Error> {
        let owner = &repo.owner.login;
        let name = &repo.name;

        let resources = fetch_resources(client, owner, name).await?;
        let (protected, unprotected) =
            classify_branches(client, owner, name, &resources.branches).await?;

        // Nothing but the owner and no other configured state: skip.
        if resources.collaborators.len() <= 1
            && resources.keys.is_empty()
            && resources.hooks.is_empty()
            && protected.is_empty()
            && unprotected.is_empty()
        {
            return Ok(None);
        }

        let collaborators = correlate(&resources.collaborators, &resources.teams, |id, login| {
            async move { active_membership(client, id, &login).await }
        })
        .await?
        .unwrap_or_else(|| CollaboratorReport {
            total_count: resources.collaborators.len(),
            ..Default::default()
        });

        let detail = client.get_repository(owner, name).await?;
        let merge_methods = MergeMethods::observed(&detail)
            .labels()
            .into_iter()
            .map(str::to_string)
            .collect();

        Ok(Some(AuditRecord {
            name: repo.full_name.clone(),
            collaborators,
            deploy_keys: resources
                .keys
                .into_iter()
                .map(|k| KeyRecord {
                    title: k.title,
                    read_only: k.read_only,
                    url: k.url,
                })
                .collect(),
            hooks: resources
                .hooks
                .into_iter()
                .map(|h| HookRecord {
                    name: h.name,
                    active: h.active,
                    url: h.url,
                })
                .collect(),
            protected_branches: protected,
            unprotected_branches: unprotected,
            merge_methods,
        }))
    }
}

#[async_trait]
impl RepoHandler for AuditHandler {
    async fn handle(&self, client: &GitHubClient, repo: &Repository) -> Result<(), Error> {
        let Some(record) = self.build_record(client, repo).await? else {
            return Ok(());
        };

        if self.json {
            if let Ok(body) = serde_json::to_string(&record) {
                println!("{body}");
            }
        } else {
            print!("{}", render_text(&record));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::AttributedCollaborator;

    fn sample_record() -> AuditRecord {
        AuditRecord {
            name: "octo/widget".to_string(),
            collaborators: CollaboratorReport {
                total_count: 2,
                admin: vec![AttributedCollaborator {
                    login: "alice".to_string(),
                    teams: vec!["core".to_string()],
                }],
                write: vec![AttributedCollaborator {
                    login: "bob".to_string(),
                    teams: Vec::new(),
                }],
                read: Vec::new(),
            },
            deploy_keys: vec![KeyRecord {
                title: "deploy".to_string(),
                read_only: true,
                url: "https://api.github.com/repos/octo/widget/keys/1".to_string(),
            }],
            hooks: Vec::new(),
            protected_branches: vec!["master".to_string()],
            unprotected_branches: vec!["develop".to_string(), "wip".to_string()],
            merge_methods: vec!["squash".to_string(), "rebase".to_string()],
        }
    }

    #[test]
    fn text_rendering_shows_every_section() {
        let text = render_text(&sample_record());

        assert!(text.starts_with("octo/widget -> \n"));
        assert!(text.contains("\tCollaborators (2):\n"));
        assert!(text.contains("\t\tAdmin (1):\n\t\t\talice (teams: core)\n"));
        assert!(text.contains("\t\tWrite (1):\n\t\t\tbob\n"));
        assert!(text.contains("\tKeys (1):\n\t\tdeploy - ro:true"));
        assert!(text.contains("\tProtected Branches (1): master\n"));
        assert!(text.contains("\tUnprotected Branches (2): develop, wip\n"));
        assert!(text.contains("\tMerge Methods: squash rebase\n"));
        assert!(text.ends_with("--\n\n"));
    }

    #[test]
    fn text_rendering_skips_single_collaborator_section() {
        let mut record = sample_record();
        record.collaborators = CollaboratorReport {
            total_count: 1,
            ..Default::default()
        };
        let text = render_text(&record);
        assert!(!text.contains("Collaborators"));
        assert!(text.contains("\tKeys (1):"));
    }

    #[test]
    fn json_rendering_uses_camel_case_fields() {
        let body = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(body["name"], "octo/widget");
        assert_eq!(body["collaborators"]["totalCount"], 2);
        assert_eq!(body["collaborators"]["admin"][0]["teams"][0], "core");
        assert_eq!(body["deployKeys"][0]["readOnly"], true);
        assert_eq!(body["protectedBranches"][0], "master");
        assert_eq!(body["mergeMethods"], serde_json::json!(["squash", "rebase"]));
    }
}
