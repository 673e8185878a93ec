//! Resolver for plain `.zip` archive URLs.

use url::Url;

use super::{ArchiveDownloader, ArchiveError, ArchiveExtractor, HttpDownloader};
use crate::config::{ReadableKeyedConfiguration, default_cache_dir};
use crate::sourcing::{
    ArchiveSource, MetadataOrigin, MetadataSource, MetadataSourceResolver,
    MetadataSourceResolverProvider, SourcingError, block_on,
};

/// Resolves `http`, `https` and `file` URLs pointing at `.zip` archives.
#[derive(Debug)]
pub struct ArchiveMetadataSourceResolver<D = HttpDownloader> {
    downloader: D,
    next: Option<Box<dyn MetadataSourceResolver>>,
}

impl ArchiveMetadataSourceResolver {
    pub fn new(next: Option<Box<dyn MetadataSourceResolver>>) -> Self {
        Self::with_downloader(HttpDownloader::default(), next)
    }
}

impl<D: ArchiveDownloader> ArchiveMetadataSourceResolver<D> {
    pub fn with_downloader(downloader: D, next: Option<Box<dyn MetadataSourceResolver>>) -> Self {
        Self { downloader, next }
    }

    fn fetch(&self, url: &Url) -> Result<Option<(Vec<u8>, MetadataOrigin)>, SourcingError> {
        if url.scheme() == "file" {
            let path = url
                .to_file_path()
                .map_err(|_| SourcingError::InvalidSource(url.to_string()))?;
            if !path.is_file() {
                tracing::debug!(path = %path.display(), "local archive not found");
                return Ok(None);
            }
            let data = std::fs::read(&path).map_err(ArchiveError::io(&path))?;
            return Ok(Some((data, MetadataOrigin::RawPath(path))));
        }

        let data = block_on(self.downloader.download(url))??;
        Ok(data.map(|data| (data, MetadataOrigin::RawUrl(url.clone()))))
    }
}

impl<D: ArchiveDownloader + 'static> MetadataSourceResolver for ArchiveMetadataSourceResolver<D> {
    fn name(&self) -> &str {
        "archive"
    }

    fn handles(&self, url: &Url, _configuration: &dyn ReadableKeyedConfiguration) -> bool {
        matches!(url.scheme(), "http" | "https" | "file")
            && url.path().to_ascii_lowercase().ends_with(".zip")
    }

    fn handle(
        &self,
        url: &Url,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<MetadataSource>, SourcingError> {
        let Some((data, origin)) = self.fetch(url)? else {
            return Ok(None);
        };

        let extractor = ArchiveExtractor::new(default_cache_dir(configuration));
        let root = extractor.unpack(url, &data)?;

        Ok(Some(ArchiveSource::new(root, origin).into()))
    }

    fn next(&self) -> Option<&dyn MetadataSourceResolver> {
        self.next.as_deref()
    }
}

/// Provides the [`ArchiveMetadataSourceResolver`]; consulted after
/// repository resolvers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveMetadataSourceResolverProvider;

impl MetadataSourceResolverProvider for ArchiveMetadataSourceResolverProvider {
    fn name(&self) -> &str {
        "archive"
    }

    fn resolver(
        &self,
        next: Option<Box<dyn MetadataSourceResolver>>,
    ) -> Box<dyn MetadataSourceResolver> {
        Box::new(ArchiveMetadataSourceResolver::new(next))
    }

    fn priority(&self) -> i32 {
        0
    }
}
