//! GitHub metadata sourcing.
//!
//! Resolves `github.com` project, commit, tree and release-tag URLs into
//! extracted zipball snapshots via the GitHub REST API:
//!
//! 1. look up the repository (default branch, URL templates)
//! 2. pin the URL's reference to a commit SHA
//! 3. collect the tags pointing at that commit
//! 4. download and extract the zipball for the SHA

mod archive;
mod client;
mod details;
mod error;
mod location;
mod provider;
mod resolver;
mod source;

pub use client::{DEFAULT_API_URL, GitHubApi, GitHubClient};
pub use details::{BranchInfo, CommitRef, GitObject, GitRef, GitRefs, RepositoryDetails};
pub use error::GitHubError;
pub use location::{GitHubLocation, GitHubReference};
pub use provider::GitHubRepositorySourceResolverProvider;
pub use resolver::GitHubRepositorySourceResolver;
pub use source::GitHubRepositorySource;
