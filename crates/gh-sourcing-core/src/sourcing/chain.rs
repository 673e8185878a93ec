//! Provider registration and chain assembly.

use url::Url;

use super::{
    MetadataSource, MetadataSourceResolver, MetadataSourceResolverProvider, SourcingError,
};
use crate::archive::ArchiveMetadataSourceResolverProvider;
use crate::config::ReadableKeyedConfiguration;
use crate::github::GitHubRepositorySourceResolverProvider;

/// Registered resolver providers.
#[derive(Debug, Default)]
pub struct ResolverRegistry {
    providers: Vec<Box<dyn MetadataSourceResolverProvider>>,
}

impl ResolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the GitHub and archive providers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(GitHubRepositorySourceResolverProvider)
            .register(ArchiveMetadataSourceResolverProvider);
        registry
    }

    pub fn register<P>(&mut self, provider: P) -> &mut Self
    where
        P: MetadataSourceResolverProvider + 'static,
    {
        self.providers.push(Box::new(provider));
        self
    }

    /// Providers in consultation order: highest priority first, ties in
    /// registration order.
    pub fn providers(&self) -> Vec<&dyn MetadataSourceResolverProvider> {
        let mut ordered: Vec<&dyn MetadataSourceResolverProvider> =
            self.providers.iter().map(|p| p.as_ref()).collect();
        ordered.sort_by_key(|p| std::cmp::Reverse(p.priority()));
        ordered
    }

    /// Link every provider's resolver into a chain.
    pub fn build(&self) -> ResolverChain {
        let head = self
            .providers()
            .into_iter()
            .rev()
            .fold(None, |next, provider| Some(provider.resolver(next)));

        ResolverChain { head }
    }
}

/// A linked chain of resolvers.
#[derive(Debug)]
pub struct ResolverChain {
    head: Option<Box<dyn MetadataSourceResolver>>,
}

impl ResolverChain {
    pub fn resolve(
        &self,
        url: &Url,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<MetadataSource>, SourcingError> {
        match &self.head {
            Some(head) => head.resolve(url, configuration),
            None => {
                tracing::warn!(%url, "no resolvers registered");
                Ok(None)
            }
        }
    }

    /// Name of the resolver that would handle `url`.
    pub fn resolver_for(
        &self,
        url: &Url,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Option<&str> {
        self.head
            .as_deref()
            .and_then(|head| head.resolver_for(url, configuration))
    }

    /// Resolver names in chain order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = self.head.as_deref();
        while let Some(resolver) = current {
            names.push(resolver.name());
            current = resolver.next();
        }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}
