//! Thin typed wrapper around the GitHub REST API.
//!
//! Every method maps to exactly one endpoint and returns either a value, a
//! [`Page`] of values, or one of the failure shapes in [`Error`]. Status
//! codes are inspected explicitly after every call: 404/403 become
//! [`Error::NotApplicable`] so callers can apply best-effort policy, while a
//! 403/429 carrying exhausted `x-ratelimit-*` headers becomes the fatal
//! [`Error::RateLimit`].

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::models::{
    Account, Branch, BranchProtection, Collaborator, CollaboratorInvite, DeployKey, Hook,
    Membership, ProtectionRequest, Release, ReleaseEdit, Repository, SearchResults, Team,
};
use crate::pagination::{parse_link_header, Page, PER_PAGE};

/// Public GitHub API root, used unless an enterprise URL is configured.
pub const DEFAULT_API_ROOT: &str = "https://api.github.com";

/// Authenticated GitHub API client.
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    api_root: String,
}

impl GitHubClient {
    /// Create a client for the given token and API root.
    pub fn new(token: &str, api_root: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("repowarden/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            token: token.to_string(),
            api_root: api_root.trim_end_matches('/').to_string(),
        })
    }

    /// The API root this client talks to.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    // -----------------------------------------------------------------------
    // Request plumbing
    // -----------------------------------------------------------------------

    async fn get_response(
        &self,
        route: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, Error> {
        let url = format!("{}{}", self.api_root, route);
        debug!(route, "GET");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .query(query)
            .send()
            .await?;

        match status_error(response.status(), response.headers(), route) {
            Some(err) => Err(err),
            None => Ok(response),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        route: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let response = self.get_response(route, query).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("decoding {route}: {e}")))
    }

    async fn get_paged<T: DeserializeOwned>(
        &self,
        route: &str,
        extra: &[(&str, String)],
        page: u32,
    ) -> Result<Page<T>, Error> {
        let mut query = vec![
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];
        query.extend(extra.iter().cloned());
        let response = self.get_response(route, &query).await?;

        let (next_page, last_page) = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(parse_link_header)
            .unwrap_or((None, None));

        let items = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("decoding {route}: {e}")))?;

        Ok(Page {
            items,
            next_page,
            last_page,
        })
    }

    async fn send_mutation<B: Serialize>(
        &self,
        method: Method,
        route: &str,
        body: Option<&B>,
    ) -> Result<(), Error> {
        let url = format!("{}{}", self.api_root, route);
        debug!(route, method = %method, "mutation");

        let mut request = self
            .http
            .request(method, &url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        match status_error(response.status(), response.headers(), route) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Accounts and repository listings
    // -----------------------------------------------------------------------

    /// The authenticated user.
    pub async fn current_user(&self) -> Result<Account, Error> {
        self.get_json("/user", &[]).await
    }

    /// One page of the repositories visible to the caller, filtered
    /// server-side by affiliation.
    pub async fn list_visible_repos(
        &self,
        affiliation: &str,
        page: u32,
    ) -> Result<Page<Repository>, Error> {
        self.get_paged(
            "/user/repos",
            &[("affiliation", affiliation.to_string())],
            page,
        )
        .await
    }

    /// Search for a single repository by owner and name substring, ranked by
    /// fork count, returning only the top hit.
    pub async fn search_top_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Repository, Error> {
        let query = [
            ("q", format!("{name} in:name user:{owner}")),
            ("sort", "forks".to_string()),
            ("order", "desc".to_string()),
            ("per_page", "1".to_string()),
        ];
        let results: SearchResults<Repository> =
            self.get_json("/search/repositories", &query).await?;

        results
            .items
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("{owner}/{name}")))
    }

    /// A single repository with its settings (merge-method flags included).
    pub async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, Error> {
        self.get_json(&format!("/repos/{owner}/{name}"), &[]).await
    }

    // -----------------------------------------------------------------------
    // Per-repository sub-resources
    // -----------------------------------------------------------------------

    pub async fn list_teams(
        &self,
        owner: &str,
        name: &str,
        page: u32,
    ) -> Result<Page<Team>, Error> {
        self.get_paged(&format!("/repos/{owner}/{name}/teams"), &[], page)
            .await
    }

    pub async fn list_collaborators(
        &self,
        owner: &str,
        name: &str,
        page: u32,
    ) -> Result<Page<Collaborator>, Error> {
        self.get_paged(&format!("/repos/{owner}/{name}/collaborators"), &[], page)
            .await
    }

    pub async fn list_deploy_keys(
        &self,
        owner: &str,
        name: &str,
        page: u32,
    ) -> Result<Page<DeployKey>, Error> {
        self.get_paged(&format!("/repos/{owner}/{name}/keys"), &[], page)
            .await
    }

    pub async fn list_hooks(
        &self,
        owner: &str,
        name: &str,
        page: u32,
    ) -> Result<Page<Hook>, Error> {
        self.get_paged(&format!("/repos/{owner}/{name}/hooks"), &[], page)
            .await
    }

    pub async fn list_branches(
        &self,
        owner: &str,
        name: &str,
        page: u32,
    ) -> Result<Page<Branch>, Error> {
        self.get_paged(&format!("/repos/{owner}/{name}/branches"), &[], page)
            .await
    }

    /// Per-branch detail; the only listing that reliably carries the
    /// protection flag.
    pub async fn get_branch(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
    ) -> Result<Branch, Error> {
        self.get_json(&format!("/repos/{owner}/{name}/branches/{branch}"), &[])
            .await
    }

    pub async fn get_branch_protection(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
    ) -> Result<BranchProtection, Error> {
        self.get_json(
            &format!("/repos/{owner}/{name}/branches/{branch}/protection"),
            &[],
        )
        .await
    }

    pub async fn update_branch_protection(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
        request: &ProtectionRequest,
    ) -> Result<(), Error> {
        self.send_mutation(
            Method::PUT,
            &format!("/repos/{owner}/{name}/branches/{branch}/protection"),
            Some(request),
        )
        .await
    }

    /// Invite or add a collaborator at the given permission string.
    pub async fn add_collaborator(
        &self,
        owner: &str,
        name: &str,
        login: &str,
        permission: &str,
    ) -> Result<(), Error> {
        let body = CollaboratorInvite {
            permission: permission.to_string(),
        };
        self.send_mutation(
            Method::PUT,
            &format!("/repos/{owner}/{name}/collaborators/{login}"),
            Some(&body),
        )
        .await
    }

    /// Membership state of a login within a team.
    pub async fn get_team_membership(
        &self,
        team_id: u64,
        login: &str,
    ) -> Result<Membership, Error> {
        self.get_json(&format!("/teams/{team_id}/memberships/{login}"), &[])
            .await
    }

    // -----------------------------------------------------------------------
    // Releases
    // -----------------------------------------------------------------------

    pub async fn list_releases(
        &self,
        owner: &str,
        name: &str,
        page: u32,
    ) -> Result<Page<Release>, Error> {
        self.get_paged(&format!("/repos/{owner}/{name}/releases"), &[], page)
            .await
    }

    pub async fn edit_release(
        &self,
        owner: &str,
        name: &str,
        release_id: u64,
        edit: &ReleaseEdit,
    ) -> Result<(), Error> {
        self.send_mutation(
            Method::PATCH,
            &format!("/repos/{owner}/{name}/releases/{release_id}"),
            Some(edit),
        )
        .await
    }

    /// Download a small text asset (checksum sidecar) by its public URL.
    /// Sidecar downloads are unauthenticated.
    pub async fn fetch_asset_text(&self, url: &str) -> Result<String, Error> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "unexpected status {} downloading {url}",
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}

/// Map a response status to an error, or `None` for success.
fn status_error(status: StatusCode, headers: &HeaderMap, route: &str) -> Option<Error> {
    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        if let Some((limit, remaining, reset)) = rate_limit_headers(headers) {
            if remaining == 0 {
                return Some(Error::RateLimit {
                    limit,
                    remaining,
                    reset,
                });
            }
        }
    }

    match status {
        StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => Some(Error::NotApplicable),
        StatusCode::UNAUTHORIZED => Some(Error::Transport(format!(
            "authentication rejected for {route}"
        ))),
        s if !s.is_success() => Some(Error::Transport(format!(
            "unexpected status {s} for {route}"
        ))),
        _ => None,
    }
}

/// Extract `(limit, remaining, reset)` from GitHub rate-limit headers.
fn rate_limit_headers(headers: &HeaderMap) -> Option<(u32, u32, DateTime<Utc>)> {
    let parse = |key: &str| {
        headers
            .get(key)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
    };

    let limit = parse("x-ratelimit-limit")? as u32;
    let remaining = parse("x-ratelimit-remaining")? as u32;
    let reset = DateTime::from_timestamp(parse("x-ratelimit-reset")?, 0).unwrap_or_else(Utc::now);

    Some((limit, remaining, reset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use reqwest::header::HeaderValue;

    fn rate_limit_map(limit: &str, remaining: &str, reset: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_str(limit).unwrap());
        headers.insert(
            "x-ratelimit-remaining",
            HeaderValue::from_str(remaining).unwrap(),
        );
        headers.insert("x-ratelimit-reset", HeaderValue::from_str(reset).unwrap());
        headers
    }

    #[test]
    fn forbidden_with_exhausted_quota_is_rate_limit() {
        let headers = rate_limit_map("5000", "0", "1700000000");
        let err = status_error(StatusCode::FORBIDDEN, &headers, "/x").unwrap();
        assert_matches!(
            err,
            Error::RateLimit {
                limit: 5000,
                remaining: 0,
                ..
            }
        );
    }

    #[test]
    fn plain_forbidden_is_not_applicable() {
        let headers = HeaderMap::new();
        assert_matches!(
            status_error(StatusCode::FORBIDDEN, &headers, "/x"),
            Some(Error::NotApplicable)
        );
    }

    #[test]
    fn forbidden_with_remaining_quota_is_not_applicable() {
        let headers = rate_limit_map("5000", "37", "1700000000");
        assert_matches!(
            status_error(StatusCode::FORBIDDEN, &headers, "/x"),
            Some(Error::NotApplicable)
        );
    }

    #[test]
    fn not_found_is_not_applicable() {
        assert_matches!(
            status_error(StatusCode::NOT_FOUND, &HeaderMap::new(), "/x"),
            Some(Error::NotApplicable)
        );
    }

    #[test]
    fn unauthorized_is_transport() {
        assert_matches!(
            status_error(StatusCode::UNAUTHORIZED, &HeaderMap::new(), "/x"),
            Some(Error::Transport(_))
        );
    }

    #[test]
    fn success_statuses_pass_through() {
        assert!(status_error(StatusCode::OK, &HeaderMap::new(), "/x").is_none());
        assert!(status_error(StatusCode::CREATED, &HeaderMap::new(), "/x").is_none());
        assert!(status_error(StatusCode::NO_CONTENT, &HeaderMap::new(), "/x").is_none());
    }

    #[test]
    fn rate_limit_headers_need_all_three() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("60"));
        assert!(rate_limit_headers(&headers).is_none());
    }

    #[test]
    fn api_root_trailing_slash_is_normalized() {
        let client = GitHubClient::new("t", "https://ghe.example.com/api/v3/").unwrap();
        assert_eq!(client.api_root(), "https://ghe.example.com/api/v3");
    }
}
