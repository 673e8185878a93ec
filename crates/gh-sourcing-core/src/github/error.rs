use crate::archive::ArchiveError;

/// Errors raised while talking to GitHub.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("GitHub API rejected the credentials (401 Unauthorized); check `github.token`")]
    Unauthorized,

    #[error(
        "GitHub API refused the request (403 Forbidden); the rate limit may be exhausted or the token lacks access"
    )]
    Forbidden,

    #[error("Request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}
