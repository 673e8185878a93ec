//! The resolver contract.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::Runtime;

use url::Url;

use super::{MetadataSource, SourcingError};
use crate::config::ReadableKeyedConfiguration;

/// Resolves URLs into metadata sources.
///
/// Resolvers form a chain: [`resolve`](Self::resolve) hands a URL to
/// [`handle`](Self::handle) when [`handles`](Self::handles) claims it and
/// otherwise delegates to [`next`](Self::next).
pub trait MetadataSourceResolver: std::fmt::Debug + Send + Sync {
    /// Short identifier used in logs and CLI output.
    fn name(&self) -> &str;

    /// Whether this resolver is responsible for `url`.
    fn handles(&self, url: &Url, configuration: &dyn ReadableKeyedConfiguration) -> bool;

    /// Resolve a claimed URL. `Ok(None)` means the URL looked right but
    /// nothing could be sourced from it.
    fn handle(
        &self,
        url: &Url,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<MetadataSource>, SourcingError>;

    /// The resolver consulted when this one does not handle a URL.
    fn next(&self) -> Option<&dyn MetadataSourceResolver>;

    /// Walk the chain starting at this resolver.
    ///
    /// A resolver that claims a URL but yields nothing ends the walk.
    fn resolve(
        &self,
        url: &Url,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<MetadataSource>, SourcingError> {
        if self.handles(url, configuration) {
            tracing::debug!(resolver = self.name(), %url, "resolver claimed url");
            return self.handle(url, configuration);
        }

        match self.next() {
            Some(next) => next.resolve(url, configuration),
            None => Ok(None),
        }
    }

    /// Name of the first resolver in the chain that claims `url`.
    fn resolver_for(
        &self,
        url: &Url,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Option<&str> {
        if self.handles(url, configuration) {
            return Some(self.name());
        }
        self.next()
            .and_then(|next| next.resolver_for(url, configuration))
    }
}

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Drive an async resolution step from the synchronous resolver API.
///
/// All resolutions share one process-wide runtime so HTTP clients can keep
/// their connection pools between calls. Must not be called from within a
/// Tokio runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, SourcingError> {
    let runtime = match RUNTIME.get() {
        Some(runtime) => runtime,
        None => {
            let runtime = Runtime::new().map_err(SourcingError::Runtime)?;
            RUNTIME.get_or_init(|| runtime)
        }
    };
    Ok(runtime.block_on(future))
}
