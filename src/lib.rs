//! RepoWarden - GitHub Repository Configuration Audit and Reconciliation
//!
//! RepoWarden walks every repository a caller can see and audits or
//! reconciles its configuration state: collaborator permissions, branch
//! protection, merge-method settings, deploy keys, webhooks, and release
//! notes.
//!
//! ## Core Features
//!
//! - **Repository Traversal**: Paginated discovery across organizations and
//!   the caller's own repositories, with client-side owner filtering
//! - **Permission Correlation**: Collaborators bucketed by tier and
//!   attributed to the teams granting that tier
//! - **Reconciliation**: Desired-versus-observed decisions with a dry-run
//!   mode for every mutating command
//! - **Rate-Limit Awareness**: Quota exhaustion aborts a run immediately
//!   instead of burning the remaining window
//! - **Enterprise Support**: Works against GitHub Enterprise API roots
//!
//! ## Modules
//!
//! - [`config`]: Runtime configuration resolution
//! - [`client`]: Typed GitHub REST API client
//! - [`selector`]: Repository selection and handler dispatch
//! - [`reconcile`]: Desired-versus-observed decision logic

pub mod audit;
pub mod client;
pub mod collaborators;
pub mod config;
pub mod correlate;
pub mod error;
pub mod fetcher;
pub mod merge;
pub mod models;
pub mod pagination;
pub mod protect;
pub mod reconcile;
pub mod release;
pub mod selector;

pub use client::GitHubClient;
pub use config::{CliOverrides, Config, FileConfig};
pub use error::Error;
pub use selector::RepoHandler;
