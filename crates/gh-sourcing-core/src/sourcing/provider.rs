//! Service provider contract for contributing resolvers.

use super::MetadataSourceResolver;

/// Priority given to providers that do not override it.
pub const DEFAULT_PRIORITY: i32 = 1;

/// Contributes a [`MetadataSourceResolver`] to a resolver chain.
///
/// Providers with a higher [`priority`](Self::priority) are consulted
/// first.
pub trait MetadataSourceResolverProvider: std::fmt::Debug + Send + Sync {
    /// Short identifier used in logs and CLI output.
    fn name(&self) -> &str;

    /// Build this provider's resolver, delegating unhandled URLs to `next`.
    fn resolver(
        &self,
        next: Option<Box<dyn MetadataSourceResolver>>,
    ) -> Box<dyn MetadataSourceResolver>;

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }
}
