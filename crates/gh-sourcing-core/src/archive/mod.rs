//! Zip archive download, extraction and root resolution.
//!
//! Extracted archives are cached by URL hash. The [`ArchiveMetadataSourceResolver`]
//! picks up plain `.zip` URLs that no repository resolver claims.

mod download;
mod error;
mod extractor;
mod resolver;

pub use download::{ArchiveDownloader, HttpDownloader};
pub use error::ArchiveError;
pub use extractor::{ArchiveExtractor, resolve_root};
pub use resolver::{ArchiveMetadataSourceResolver, ArchiveMetadataSourceResolverProvider};
