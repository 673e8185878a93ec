//! Classification of github.com URLs.

use url::Url;

const GITHUB_HOST: &str = "github.com";

/// What a github.com URL points at within a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubReference {
    /// `github.com/<owner>/<repo>`
    DefaultBranch,
    /// `…/commit/<sha>`
    Commit(String),
    /// `…/tree/<branch>`; the branch may contain slashes
    Tree(String),
    /// `…/releases/tag/<tag>`
    ReleaseTag(String),
    /// Any other repository page (issues, pulls, bare releases, …)
    Unsupported(String),
}

/// A parsed github.com repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubLocation {
    pub owner: String,
    pub repository: String,
    pub reference: GitHubReference,
}

impl GitHubLocation {
    /// Whether `url` names a repository on github.com.
    ///
    /// Zip URLs, in any letter case, are left to archive resolvers.
    pub fn is_project_url(url: &Url) -> bool {
        url.host_str() == Some(GITHUB_HOST)
            && path_segments(url).len() >= 2
            && !url.path().to_ascii_lowercase().ends_with(".zip")
    }

    /// Parse a github.com URL. Returns `None` for other hosts and for
    /// URLs without both owner and repository.
    pub fn parse(url: &Url) -> Option<Self> {
        if url.host_str() != Some(GITHUB_HOST) {
            return None;
        }

        let mut parts = path_segments(url);
        if parts.len() < 2 {
            return None;
        }

        let reference = if parts.len() < 4 {
            GitHubReference::DefaultBranch
        } else {
            match parts[2].as_str() {
                "commit" => GitHubReference::Commit(parts[3].clone()),
                "tree" => GitHubReference::Tree(parts[3..].join("/")),
                "releases" if parts.len() >= 5 && parts[3] == "tag" => {
                    GitHubReference::ReleaseTag(parts[4].clone())
                }
                other => GitHubReference::Unsupported(other.to_string()),
            }
        };

        parts.truncate(2);
        let repository = parts.pop()?;
        let owner = parts.pop()?;

        Some(Self {
            owner,
            repository,
            reference,
        })
    }
}

/// Non-blank path segments of a URL.
fn path_segments(url: &Url) -> Vec<String> {
    url.path()
        .split('/')
        .filter(|segment| !segment.trim().is_empty())
        .map(str::to_string)
        .collect()
}
