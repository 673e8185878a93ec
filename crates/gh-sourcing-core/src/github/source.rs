//! GitHub repository snapshots.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sourcing::{MetadataOrigin, SourcingError};

/// Metadata sourced from a GitHub repository at a specific commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubRepositorySource {
    username: String,
    repository: String,
    branch: String,
    tags: BTreeSet<String>,
    commit: String,
    path: PathBuf,
    origin: MetadataOrigin,
}

impl GitHubRepositorySource {
    /// Create a source. `origin` accepts a [`url::Url`], a [`PathBuf`] or a
    /// [`MetadataOrigin`].
    ///
    /// # Errors
    ///
    /// Returns [`SourcingError::InvalidSource`] when `username`,
    /// `repository`, `branch` or `commit` is empty.
    pub fn new(
        username: impl Into<String>,
        repository: impl Into<String>,
        branch: impl Into<String>,
        tags: impl IntoIterator<Item = String>,
        commit: impl Into<String>,
        path: impl Into<PathBuf>,
        origin: impl Into<MetadataOrigin>,
    ) -> Result<Self, SourcingError> {
        let source = Self {
            username: username.into(),
            repository: repository.into(),
            branch: branch.into(),
            tags: tags.into_iter().collect(),
            commit: commit.into(),
            path: path.into(),
            origin: origin.into(),
        };

        for (field, value) in [
            ("username", &source.username),
            ("repository", &source.repository),
            ("branch", &source.branch),
            ("commit", &source.commit),
        ] {
            if value.trim().is_empty() {
                return Err(SourcingError::InvalidSource(format!(
                    "GitHub source is missing a {}",
                    field
                )));
            }
        }

        Ok(source)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Tags pointing at [`commit`](Self::commit).
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn commit(&self) -> &str {
        &self.commit
    }

    /// Root of the extracted snapshot.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> &MetadataOrigin {
        &self.origin
    }
}
