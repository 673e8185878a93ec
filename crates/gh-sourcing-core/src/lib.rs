//! gh-sourcing Core Library
//!
//! Metadata sourcing for license scanning: resolves repository and
//! archive URLs into local directories through a chain of pluggable
//! resolvers, with a GitHub resolver backed by the REST API.

pub mod archive;
pub mod config;
pub mod github;
pub mod sourcing;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigError, KeyedConfiguration, KeyedConfigurationStore, ReadableKeyedConfiguration,
    };

    // Sourcing SPI
    pub use crate::sourcing::{
        ArchiveSource, MetadataOrigin, MetadataSource, MetadataSourceResolver,
        MetadataSourceResolverProvider, ResolverChain, ResolverRegistry, SourcingError,
    };

    // GitHub
    pub use crate::github::{
        GitHubError, GitHubRepositorySource, GitHubRepositorySourceResolver,
        GitHubRepositorySourceResolverProvider,
    };

    // Archives
    pub use crate::archive::{
        ArchiveError, ArchiveMetadataSourceResolver, ArchiveMetadataSourceResolverProvider,
    };
}
