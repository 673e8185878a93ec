//! Zipball download and extraction.

use std::path::PathBuf;

use url::Url;

use super::{GitHubApi, GitHubError};
use crate::archive::ArchiveExtractor;
use crate::config::{ReadableKeyedConfiguration, default_cache_dir};

/// Root directory of the extracted zipball at `url`.
///
/// Zipball URLs are pinned to a commit SHA, so a previous extraction is
/// reused as is. Returns `None` when GitHub has no archive for the URL.
pub(crate) async fn fetch_archive_root<A: GitHubApi>(
    api: &A,
    url: &Url,
    configuration: &dyn ReadableKeyedConfiguration,
) -> Result<Option<PathBuf>, GitHubError> {
    let extractor = ArchiveExtractor::new(default_cache_dir(configuration));

    if let Some(root) = extractor.cached_root(url)? {
        return Ok(Some(root));
    }

    let Some(data) = api.download_archive(url, configuration).await? else {
        return Ok(None);
    };

    let root = extractor.unpack(url, &data)?;
    tracing::trace!(%url, root = %root.display(), "Archive input source extracted");

    Ok(Some(root))
}
