//! Resolved metadata sources.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::MetadataOrigin;
use crate::github::GitHubRepositorySource;

/// A resolved metadata source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetadataSource {
    /// Snapshot of a GitHub repository at a specific commit
    #[serde(rename = "github")]
    GitHub(GitHubRepositorySource),
    /// Extracted zip archive
    Archive(ArchiveSource),
}

impl MetadataSource {
    /// Directory holding the metadata.
    pub fn path(&self) -> &Path {
        match self {
            Self::GitHub(source) => source.path(),
            Self::Archive(source) => &source.path,
        }
    }

    pub fn origin(&self) -> &MetadataOrigin {
        match self {
            Self::GitHub(source) => source.origin(),
            Self::Archive(source) => &source.origin,
        }
    }

    /// Commit SHA for repository sources.
    pub fn commit(&self) -> Option<&str> {
        match self {
            Self::GitHub(source) => Some(source.commit()),
            Self::Archive(_) => None,
        }
    }

    pub fn as_github(&self) -> Option<&GitHubRepositorySource> {
        match self {
            Self::GitHub(source) => Some(source),
            _ => None,
        }
    }

    pub fn as_archive(&self) -> Option<&ArchiveSource> {
        match self {
            Self::Archive(source) => Some(source),
            _ => None,
        }
    }
}

impl From<GitHubRepositorySource> for MetadataSource {
    fn from(source: GitHubRepositorySource) -> Self {
        Self::GitHub(source)
    }
}

impl From<ArchiveSource> for MetadataSource {
    fn from(source: ArchiveSource) -> Self {
        Self::Archive(source)
    }
}

/// Metadata extracted from a plain zip archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSource {
    /// Root directory of the extracted archive
    pub path: PathBuf,
    /// Where the archive was fetched from
    pub origin: MetadataOrigin,
}

impl ArchiveSource {
    pub fn new(path: impl Into<PathBuf>, origin: impl Into<MetadataOrigin>) -> Self {
        Self {
            path: path.into(),
            origin: origin.into(),
        }
    }
}
