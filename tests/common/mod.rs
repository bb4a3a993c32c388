//! Common test fixtures for the wiremock-backed integration tests.

use serde_json::{json, Value};
use wiremock::{MockServer, ResponseTemplate};

use repowarden::Config;

/// JSON body for a repository listing entry.
pub fn repo_json(owner: &str, name: &str) -> Value {
    json!({
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "owner": { "login": owner }
    })
}

/// JSON body for a single-repo get, including merge-method flags.
pub fn repo_detail_json(
    owner: &str,
    name: &str,
    commits: bool,
    squash: bool,
    rebase: bool,
) -> Value {
    json!({
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "owner": { "login": owner },
        "allow_merge_commit": commits,
        "allow_squash_merge": squash,
        "allow_rebase_merge": rebase
    })
}

/// JSON body for a collaborator with explicit permission booleans.
pub fn collaborator_json(login: &str, admin: bool, push: bool, pull: bool) -> Value {
    json!({
        "login": login,
        "permissions": { "admin": admin, "push": push, "pull": pull }
    })
}

/// A 200 response whose `Link` header points at the given next page.
pub fn page_response(body: Value, server: &MockServer, route: &str, next: u32) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(body)
        .insert_header(
            "link",
            format!(
                "<{}{}?per_page=100&page={}>; rel=\"next\"",
                server.uri(),
                route,
                next
            )
            .as_str(),
        )
}

/// A 403 response carrying exhausted rate-limit headers.
pub fn rate_limited_response() -> ResponseTemplate {
    ResponseTemplate::new(403)
        .insert_header("x-ratelimit-limit", "5000")
        .insert_header("x-ratelimit-remaining", "0")
        .insert_header("x-ratelimit-reset", "1700000000")
}

/// A traversal configuration scoped to the given owners.
pub fn config_for(orgs: &[&str], include_user: bool, dry_run: bool) -> Config {
    Config {
        token: "test-token".to_string(),
        enterprise_url: None,
        orgs: orgs.iter().map(|s| s.to_string()).collect(),
        include_user,
        repo: None,
        dry_run,
        json: false,
    }
}
