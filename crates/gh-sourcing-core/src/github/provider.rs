use super::GitHubRepositorySourceResolver;
use crate::sourcing::{MetadataSourceResolver, MetadataSourceResolverProvider};

/// Provides the [`GitHubRepositorySourceResolver`] at the default priority.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubRepositorySourceResolverProvider;

impl MetadataSourceResolverProvider for GitHubRepositorySourceResolverProvider {
    fn name(&self) -> &str {
        "github"
    }

    fn resolver(
        &self,
        next: Option<Box<dyn MetadataSourceResolver>>,
    ) -> Box<dyn MetadataSourceResolver> {
        Box::new(GitHubRepositorySourceResolver::new(next))
    }
}
