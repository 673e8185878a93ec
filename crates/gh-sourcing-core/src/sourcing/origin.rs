//! Where a metadata source came from.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

/// The raw location a metadata source was resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum MetadataOrigin {
    /// Remote location, e.g. a GitHub project URL
    RawUrl(Url),
    /// Local filesystem location
    RawPath(PathBuf),
}

impl From<Url> for MetadataOrigin {
    fn from(url: Url) -> Self {
        Self::RawUrl(url)
    }
}

impl From<PathBuf> for MetadataOrigin {
    fn from(path: PathBuf) -> Self {
        Self::RawPath(path)
    }
}

impl fmt::Display for MetadataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RawUrl(url) => write!(f, "{}", url),
            Self::RawPath(path) => write!(f, "{}", path.display()),
        }
    }
}
