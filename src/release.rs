//! The `release` command: rewrite release notes with per-platform install
//! instructions.
//!
//! Assets follow the `{repo}-{os}-{arch}[.sha256|.md5]` naming convention.
//! Binaries and their checksum sidecars are folded into a per-(os, arch)
//! matrix, the instructions body is rendered from it, and the release is
//! edited in place with its name reset to the tag name. There is no no-op
//! path; the body is always regenerated.

use std::collections::BTreeMap;
use std::future::Future;

use async_trait::async_trait;
use tracing::debug;

use crate::client::GitHubClient;
use crate::error::Error;
use crate::models::{ReleaseAsset, ReleaseEdit, Repository};
use crate::pagination::walk;
use crate::selector::RepoHandler;

/// Download URL, binary name, and checksums for one (os, arch) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixEntry {
    pub binary_name: String,
    pub binary_url: String,
    pub sha256: String,
    pub md5: String,
}

/// os -> arch -> entry. BTreeMap keeps the rendered sections in a stable
/// order across runs.
pub type Matrix = BTreeMap<String, BTreeMap<String, MatrixEntry>>;

/// Split `{repo}-{os}-{arch}` into its (os, arch) pair.
fn platform_pair(repo_name: &str, stem: &str) -> Option<(String, String)> {
    let trimmed = stem.strip_prefix(&format!("{repo_name}-")).unwrap_or(stem);
    let (os, arch) = trimmed.split_once('-')?;
    Some((os.to_string(), arch.to_string()))
}

/// Fold a release's assets into the platform matrix. `fetch_text` downloads
/// a sidecar asset's content; the checksum is the token before the first
/// space (`sha256sum`-style "hash  filename" lines).
pub async fn build_matrix<F, Fut>(
    repo_name: &str,
    assets: &[ReleaseAsset],
    mut fetch_text: F,
) -> Result<Matrix, Error>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, Error>>,
{
    let mut matrix = Matrix::new();

    for asset in assets {
        if !asset.name.contains('.') {
            // A bare name is the binary itself.
            if let Some((os, arch)) = platform_pair(repo_name, &asset.name) {
                let entry = matrix.entry(os).or_default().entry(arch).or_default();
                entry.binary_name = asset.name.clone();
                entry.binary_url = asset.browser_download_url.clone();
            }
        } else if let Some(stem) = asset.name.strip_suffix(".sha256") {
            if let Some((os, arch)) = platform_pair(repo_name, stem) {
                let content = fetch_text(asset.browser_download_url.clone()).await?;
                let entry = matrix.entry(os).or_default().entry(arch).or_default();
                entry.sha256 = checksum_token(&content);
            }
        } else if let Some(stem) = asset.name.strip_suffix(".md5") {
            if let Some((os, arch)) = platform_pair(repo_name, stem) {
                let content = fetch_text(asset.browser_download_url.clone()).await?;
                let entry = matrix.entry(os).or_default().entry(arch).or_default();
                entry.md5 = checksum_token(&content);
            }
        }
    }

    Ok(matrix)
}

fn checksum_token(content: &str) -> String {
    content.split(' ').next().unwrap_or_default().to_string()
}

/// Render the install-instructions body from the platform matrix.
pub fn render_body(repo_name: &str, matrix: &Matrix) -> String {
    let upper = repo_name.to_uppercase();
    let mut body = String::from(
        "Below are easy install instructions by OS and Architecture. \
         As always there are always the standard instructions in the \
         [README.md](README.md) as well.\n",
    );

    for (os, archs) in matrix {
        body += &format!("\n#### {os}\n");

        for (arch, entry) in archs {
            body += &format!(
                "\n##### {arch} - {os}\n\n\
                 ```console\n\
                 # Export the sha256sum for verification.\n\
                 $ export {upper}_SHA256=\"{sha}\"\n\
                 \n\
                 # Download and check the sha256sum.\n\
                 $ curl -fSL \"{url}\" -o \"/usr/local/bin/{repo}\" \\\n\
                 \t&& echo \"${{{upper}_SHA256}}  /usr/local/bin/{repo}\" | sha256sum -c - \\\n\
                 \t&& chmod a+x \"/usr/local/bin/{repo}\"\n\
                 \n\
                 $ echo \"{repo} installed!\"\n\
                 \n\
                 # Run it!\n\
                 $ {repo} -h\n\
                 ```\n",
                sha = entry.sha256,
                url = entry.binary_url,
                repo = repo_name,
            );
        }
    }

    body
}

/// Handler for the `release` command.
pub struct ReleaseHandler {
    all: bool,
    dry_run: bool,
}

impl ReleaseHandler {
    pub fn new(all: bool, dry_run: bool) -> Self {
        Self { all, dry_run }
    }
}

#[async_trait]
impl RepoHandler for ReleaseHandler {
    async fn handle(&self, client: &GitHubClient, repo: &Repository) -> Result<(), Error> {
        let owner = &repo.owner.login;
        let name = &repo.name;

        let releases = match walk(|page| client.list_releases(owner, name, page)).await {
            Ok(releases) => releases,
            // No releases visible here, nothing to rewrite.
            Err(Error::NotApplicable) => return Ok(()),
            Err(err) => return Err(err),
        };
        if releases.is_empty() {
            return Ok(());
        }

        // The listing is newest-first; without --all only the most recent
        // release (draft or not) is rewritten.
        let count = if self.all { releases.len() } else { 1 };

        for release in &releases[..count] {
            let matrix = build_matrix(name, &release.assets, |url| async move {
                client.fetch_asset_text(&url).await
            })
            .await?;
            let body = render_body(name, &matrix);

            if self.dry_run {
                println!(
                    "[UPDATE] {} release {} notes will be rewritten",
                    repo.full_name, release.tag_name
                );
                continue;
            }

            let edit = ReleaseEdit {
                name: release.tag_name.clone(),
                body,
            };
            match client.edit_release(owner, name, release.id, &edit).await {
                // The token may lack write access to this release.
                Err(Error::NotApplicable) => {
                    debug!(repo = %repo.full_name, tag = %release.tag_name, "not allowed to edit release");
                }
                Err(err) => return Err(err),
                Ok(()) => {}
            }
            println!(
                "[OK] {} updated release {}",
                repo.full_name, release.tag_name
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str, url: &str) -> ReleaseAsset {
        ReleaseAsset {
            name: name.to_string(),
            browser_download_url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn matrix_pairs_binary_with_its_sidecar() {
        let assets = vec![
            asset("tool-linux-amd64", "https://dl/tool-linux-amd64"),
            asset("tool-linux-amd64.sha256", "https://dl/tool-linux-amd64.sha256"),
        ];

        let matrix = build_matrix("tool", &assets, |_| async {
            Ok("abc123  tool-linux-amd64".to_string())
        })
        .await
        .unwrap();

        let entry = &matrix["linux"]["amd64"];
        assert_eq!(entry.sha256, "abc123");
        assert_eq!(entry.binary_url, "https://dl/tool-linux-amd64");
        assert_eq!(entry.binary_name, "tool-linux-amd64");
    }

    #[tokio::test]
    async fn matrix_ignores_assets_without_platform_pair() {
        let assets = vec![
            asset("tool", "https://dl/tool"),
            asset("README.tar.gz", "https://dl/readme"),
        ];

        let matrix = build_matrix("tool", &assets, |_| async { Ok(String::new()) })
            .await
            .unwrap();
        assert!(matrix.is_empty());
    }

    #[tokio::test]
    async fn matrix_records_md5_sidecars_separately() {
        let assets = vec![
            asset("tool-darwin-arm64.md5", "https://dl/tool-darwin-arm64.md5"),
        ];

        let matrix = build_matrix("tool", &assets, |_| async {
            Ok("feedface  tool-darwin-arm64".to_string())
        })
        .await
        .unwrap();
        assert_eq!(matrix["darwin"]["arm64"].md5, "feedface");
        assert!(matrix["darwin"]["arm64"].sha256.is_empty());
    }

    #[tokio::test]
    async fn matrix_propagates_sidecar_download_failures() {
        let assets = vec![asset("tool-linux-amd64.sha256", "https://dl/x")];
        let result = build_matrix("tool", &assets, |_| async {
            Err(Error::Transport("connection reset".to_string()))
        })
        .await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[test]
    fn checksum_token_stops_at_first_space() {
        assert_eq!(checksum_token("abc123  tool-linux-amd64"), "abc123");
        assert_eq!(checksum_token("abc123"), "abc123");
        assert_eq!(checksum_token(""), "");
    }

    #[test]
    fn body_renders_one_section_per_platform() {
        let mut matrix = Matrix::new();
        matrix.entry("linux".to_string()).or_default().insert(
            "amd64".to_string(),
            MatrixEntry {
                binary_name: "tool-linux-amd64".to_string(),
                binary_url: "https://dl/tool-linux-amd64".to_string(),
                sha256: "abc123".to_string(),
                md5: String::new(),
            },
        );

        let body = render_body("tool", &matrix);
        assert!(body.contains("#### linux"));
        assert!(body.contains("##### amd64 - linux"));
        assert!(body.contains("$ export TOOL_SHA256=\"abc123\""));
        assert!(body.contains("curl -fSL \"https://dl/tool-linux-amd64\""));
        assert!(body.contains("${TOOL_SHA256}  /usr/local/bin/tool"));
    }

    #[test]
    fn body_orders_platforms_deterministically() {
        let mut matrix = Matrix::new();
        matrix
            .entry("windows".to_string())
            .or_default()
            .insert("amd64".to_string(), MatrixEntry::default());
        matrix
            .entry("darwin".to_string())
            .or_default()
            .insert("arm64".to_string(), MatrixEntry::default());

        let body = render_body("tool", &matrix);
        let darwin = body.find("#### darwin").unwrap();
        let windows = body.find("#### windows").unwrap();
        assert!(darwin < windows);
    }
}
