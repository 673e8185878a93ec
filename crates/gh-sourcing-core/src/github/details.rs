//! GitHub REST API payloads and URL templates.

use std::collections::BTreeSet;

use serde::Deserialize;

/// The parts of `GET /repos/{owner}/{repo}` needed for sourcing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryDetails {
    pub default_branch: String,
    /// Template such as `https://api.github.com/repos/o/r/branches{/branch}`
    pub branches_url: String,
    /// Template such as `https://api.github.com/repos/o/r/{archive_format}{/ref}`
    pub archive_url: String,
}

impl RepositoryDetails {
    /// Expand `branches_url` for a single branch.
    pub fn branch_url(&self, branch: &str) -> String {
        self.branches_url
            .replacen("{/branch}", &format!("/{}", branch), 1)
    }

    /// Expand `archive_url` into the zipball URL for a commit.
    pub fn zipball_url(&self, sha: &str) -> String {
        self.archive_url
            .replacen("{/ref}", &format!("/{}", sha), 1)
            .replacen("{archive_format}", "zipball", 1)
    }
}

/// `GET /repos/{owner}/{repo}/branches/{branch}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub commit: CommitRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

/// A git reference such as `refs/tags/v1.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub reference: String,
    pub object: GitObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitObject {
    pub sha: String,
}

/// `git/ref/tags/{tag}` answers with one reference on an exact match and
/// with a list when only prefixes match.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GitRefs {
    One(GitRef),
    Many(Vec<GitRef>),
}

impl GitRefs {
    /// Object SHA of `refs/tags/<tag>`, falling back to the first
    /// reference of a list.
    pub fn tag_sha(&self, tag: &str) -> Option<&str> {
        match self {
            Self::One(reference) => Some(reference.object.sha.as_str()),
            Self::Many(references) => {
                let exact = format!("refs/tags/{}", tag);
                references
                    .iter()
                    .find(|r| r.reference == exact)
                    .or_else(|| references.first())
                    .map(|r| r.object.sha.as_str())
            }
        }
    }
}

/// Names of the tags in `references` pointing at `sha`.
///
/// The `status` tag is skipped.
pub(crate) fn tags_pointing_at(references: &[GitRef], sha: &str) -> BTreeSet<String> {
    references
        .iter()
        .filter(|r| r.object.sha == sha)
        .map(|r| {
            r.reference
                .strip_prefix("refs/tags/")
                .unwrap_or(&r.reference)
                .to_string()
        })
        .filter(|tag| tag != "status")
        .collect()
}

pub(crate) fn repository_url(api: &str, owner: &str, repository: &str) -> String {
    format!("{}/repos/{}/{}", api, owner, repository)
}

pub(crate) fn tag_ref_url(api: &str, owner: &str, repository: &str, tag: &str) -> String {
    format!("{}/repos/{}/{}/git/ref/tags/{}", api, owner, repository, tag)
}

pub(crate) fn tag_refs_url(api: &str, owner: &str, repository: &str) -> String {
    format!("{}/repos/{}/{}/git/refs/tags", api, owner, repository)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> RepositoryDetails {
        RepositoryDetails {
            default_branch: "main".to_string(),
            branches_url: "https://api.github.com/repos/whichlicense/core-libs/branches{/branch}"
                .to_string(),
            archive_url:
                "https://api.github.com/repos/whichlicense/core-libs/{archive_format}{/ref}"
                    .to_string(),
        }
    }

    fn git_ref(reference: &str, sha: &str) -> GitRef {
        GitRef {
            reference: reference.to_string(),
            object: GitObject {
                sha: sha.to_string(),
            },
        }
    }

    #[test]
    fn test_branch_url_expands_template() {
        assert_eq!(
            details().branch_url("sourcing"),
            "https://api.github.com/repos/whichlicense/core-libs/branches/sourcing"
        );
    }

    #[test]
    fn test_zipball_url_expands_template() {
        assert_eq!(
            details().zipball_url("0536e94bddb63f1bf786ea8963a23b7ce39e3726"),
            "https://api.github.com/repos/whichlicense/core-libs/zipball/0536e94bddb63f1bf786ea8963a23b7ce39e3726"
        );
    }

    #[test]
    fn test_repository_details_ignores_unknown_fields() {
        let json = r#"{
            "id": 1,
            "full_name": "whichlicense/core-libs",
            "default_branch": "main",
            "branches_url": "https://api.github.com/repos/whichlicense/core-libs/branches{/branch}",
            "archive_url": "https://api.github.com/repos/whichlicense/core-libs/{archive_format}{/ref}"
        }"#;

        let parsed: RepositoryDetails = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, details());
    }

    #[test]
    fn test_tags_pointing_at_filters_and_strips_prefix() {
        let refs = vec![
            git_ref("refs/tags/v0.2.1", "abc"),
            git_ref("refs/tags/latest", "abc"),
            git_ref("refs/tags/status", "abc"),
            git_ref("refs/tags/v0.2.0", "def"),
        ];

        let tags = tags_pointing_at(&refs, "abc");
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec!["latest".to_string(), "v0.2.1".to_string()]
        );
        assert!(tags_pointing_at(&refs, "fff").is_empty());
    }

    #[test]
    fn test_git_refs_single_object() {
        let json = r#"{
            "ref": "refs/tags/v0.2.1",
            "node_id": "x",
            "object": { "sha": "abc", "type": "commit", "url": "https://example.com" }
        }"#;

        let refs: GitRefs = serde_json::from_str(json).unwrap();
        assert_eq!(refs.tag_sha("v0.2.1"), Some("abc"));
    }

    #[test]
    fn test_git_refs_list_prefers_exact_match() {
        let json = r#"[
            { "ref": "refs/tags/v1.0.0-rc1", "object": { "sha": "rc" } },
            { "ref": "refs/tags/v1.0.0", "object": { "sha": "final" } }
        ]"#;

        let refs: GitRefs = serde_json::from_str(json).unwrap();
        assert_eq!(refs.tag_sha("v1.0.0"), Some("final"));
        assert_eq!(refs.tag_sha("v1"), Some("rc"));
        assert_eq!(GitRefs::Many(Vec::new()).tag_sha("v1"), None);
    }

    #[test]
    fn test_api_urls() {
        let api = "https://api.github.com";
        assert_eq!(
            repository_url(api, "whichlicense", "core-libs"),
            "https://api.github.com/repos/whichlicense/core-libs"
        );
        assert_eq!(
            tag_ref_url(api, "whichlicense", "core-libs", "v0.2.1"),
            "https://api.github.com/repos/whichlicense/core-libs/git/ref/tags/v0.2.1"
        );
        assert_eq!(
            tag_refs_url(api, "whichlicense", "core-libs"),
            "https://api.github.com/repos/whichlicense/core-libs/git/refs/tags"
        );
    }
}
