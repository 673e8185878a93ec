//! Errors surfaced by metadata source resolution.

use crate::archive::ArchiveError;
use crate::github::GitHubError;

/// Errors raised while resolving a metadata source.
///
/// A resolver that simply cannot find anything for a URL returns
/// `Ok(None)`; errors are reserved for failures the caller must act on.
#[derive(Debug, thiserror::Error)]
pub enum SourcingError {
    #[error("Invalid metadata source: {0}")]
    InvalidSource(String),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("Failed to start async runtime")]
    Runtime(#[source] std::io::Error),
}
