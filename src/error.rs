//! Error taxonomy for the traversal and reconciliation engine.
//!
//! Only a handful of failure shapes matter to the core: transport problems,
//! rate-limit exhaustion, best-effort 404/403 responses, bad command flags,
//! and a single-repository lookup that found nothing. Everything the GitHub
//! API can throw at us is folded into one of these.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Network or protocol failure. Fatal for the repository being processed;
    /// fatal for the run if it happens during setup.
    #[error("transport error: {0}")]
    Transport(String),

    /// API rate limit exhausted. Always fatal: the whole traversal aborts
    /// immediately, no backoff or retry is attempted.
    #[error("rate limit exceeded ({remaining}/{limit} remaining, resets at {reset})")]
    RateLimit {
        limit: u32,
        remaining: u32,
        reset: DateTime<Utc>,
    },

    /// A best-effort sub-resource answered 404 or 403. The resource is
    /// treated as empty; this never crosses a component boundary as an error.
    #[error("resource not accessible (404/403)")]
    NotApplicable,

    /// Malformed command flags, caught before any remote call is made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The single-repository search yielded no match.
    #[error("not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether this error must abort the entire traversal rather than just
    /// the repository currently being processed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::RateLimit { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
