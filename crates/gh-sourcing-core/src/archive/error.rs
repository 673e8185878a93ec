use std::path::PathBuf;

use url::Url;

/// Errors raised while downloading or extracting archives.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read archive")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to download archive from {url}")]
    Download {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
