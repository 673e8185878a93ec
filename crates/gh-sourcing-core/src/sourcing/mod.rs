//! Metadata sourcing SPI.
//!
//! A [`MetadataSourceResolver`] turns a URL into a [`MetadataSource`]: a
//! local directory holding the metadata plus where it came from.
//! Resolvers are contributed by [`MetadataSourceResolverProvider`]s and
//! linked into a chain of responsibility by the [`ResolverRegistry`]:
//! each resolver either claims a URL or hands it to the next one.

mod chain;
mod error;
mod origin;
mod provider;
mod resolver;
mod source;

pub use chain::{ResolverChain, ResolverRegistry};
pub use error::SourcingError;
pub use origin::MetadataOrigin;
pub use provider::{DEFAULT_PRIORITY, MetadataSourceResolverProvider};
pub use resolver::MetadataSourceResolver;
pub use source::{ArchiveSource, MetadataSource};

pub(crate) use resolver::block_on;
