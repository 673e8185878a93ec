//! Resolver for github.com repository URLs.

use std::collections::BTreeSet;

use url::Url;

use super::archive::fetch_archive_root;
use super::{
    GitHubApi, GitHubClient, GitHubLocation, GitHubReference, GitHubRepositorySource,
};
use crate::config::ReadableKeyedConfiguration;
use crate::sourcing::{MetadataSource, MetadataSourceResolver, SourcingError, block_on};

/// Resolves github.com project, commit, tree and release-tag URLs into
/// extracted repository snapshots.
///
/// `.zip` URLs are not handled and pass on to the next resolver.
#[derive(Debug)]
pub struct GitHubRepositorySourceResolver<A = GitHubClient> {
    api: A,
    next: Option<Box<dyn MetadataSourceResolver>>,
}

impl GitHubRepositorySourceResolver {
    pub fn new(next: Option<Box<dyn MetadataSourceResolver>>) -> Self {
        Self::with_api(GitHubClient::new(), next)
    }
}

impl<A: GitHubApi> GitHubRepositorySourceResolver<A> {
    pub fn with_api(api: A, next: Option<Box<dyn MetadataSourceResolver>>) -> Self {
        Self { api, next }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    async fn resolve_location(
        &self,
        location: &GitHubLocation,
        origin: &Url,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<GitHubRepositorySource>, SourcingError> {
        let GitHubLocation {
            owner,
            repository,
            reference,
        } = location;

        let Some(details) = self.api.repository(owner, repository, configuration).await? else {
            tracing::debug!("Repository \"{}/{}\" not found", owner, repository);
            return Ok(None);
        };

        let (branch, commit, tags) = match reference {
            GitHubReference::DefaultBranch => {
                let branch = details.default_branch.clone();
                let Some(sha) = self.api.branch_sha(&details, &branch, configuration).await?
                else {
                    return Ok(None);
                };
                let tags = self
                    .api
                    .tags_for_sha(owner, repository, &sha, configuration)
                    .await?;
                (branch, sha, tags)
            }
            GitHubReference::Commit(sha) => {
                // TODO: look up the branch containing the commit instead of assuming the default branch
                let tags = self
                    .api
                    .tags_for_sha(owner, repository, sha, configuration)
                    .await?;
                (details.default_branch.clone(), sha.clone(), tags)
            }
            GitHubReference::Tree(branch) => {
                let Some(sha) = self.api.branch_sha(&details, branch, configuration).await? else {
                    return Ok(None);
                };
                let tags = self
                    .api
                    .tags_for_sha(owner, repository, &sha, configuration)
                    .await?;
                (branch.clone(), sha, tags)
            }
            GitHubReference::ReleaseTag(tag) => {
                let Some(sha) = self
                    .api
                    .tag_sha(owner, repository, tag, configuration)
                    .await?
                else {
                    return Ok(None);
                };
                (
                    details.default_branch.clone(),
                    sha,
                    BTreeSet::from([tag.clone()]),
                )
            }
            GitHubReference::Unsupported(kind) => {
                tracing::debug!(%origin, kind, "Unsupported GitHub url");
                return Ok(None);
            }
        };

        let download = details.zipball_url(&commit);
        let Ok(download) = Url::parse(&download) else {
            tracing::debug!(url = %download, "Malformed archive url");
            return Ok(None);
        };

        let Some(path) = fetch_archive_root(&self.api, &download, configuration).await? else {
            return Ok(None);
        };

        GitHubRepositorySource::new(
            owner.as_str(),
            repository.as_str(),
            branch,
            tags,
            commit,
            path,
            origin.clone(),
        )
        .map(Some)
    }
}

impl<A: GitHubApi + 'static> MetadataSourceResolver for GitHubRepositorySourceResolver<A> {
    fn name(&self) -> &str {
        "github"
    }

    fn handles(&self, url: &Url, _configuration: &dyn ReadableKeyedConfiguration) -> bool {
        GitHubLocation::is_project_url(url)
    }

    fn handle(
        &self,
        url: &Url,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<MetadataSource>, SourcingError> {
        let Some(location) = GitHubLocation::parse(url) else {
            return Ok(None);
        };

        let source = block_on(self.resolve_location(&location, url, configuration))??;
        Ok(source.map(MetadataSource::from))
    }

    fn next(&self) -> Option<&dyn MetadataSourceResolver> {
        self.next.as_deref()
    }
}
