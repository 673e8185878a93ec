//! Archive extraction into the local cache

use std::io::Cursor;
use std::path::{Path, PathBuf};

use url::Url;

use super::ArchiveError;

/// Times a staged extraction is retried when a concurrent writer swaps the
/// destination away between the rename and the check.
const PLACE_ATTEMPTS: usize = 3;

/// Extracts zip archives into a cache directory keyed by source URL.
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    /// Root of all extracted archives
    cache_dir: PathBuf,
}

impl ArchiveExtractor {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Directory an archive downloaded from `url` is extracted into.
    pub fn extract_dir(&self, url: &Url) -> PathBuf {
        self.cache_dir.join(hash_url(url))
    }

    /// Root of a previous extraction of `url`, if one exists.
    pub fn cached_root(&self, url: &Url) -> Result<Option<PathBuf>, ArchiveError> {
        let dir = self.extract_dir(url);
        if !dir.is_dir() {
            return Ok(None);
        }

        tracing::debug!(%url, dir = %dir.display(), "reusing extracted archive");
        resolve_root(&dir).map(Some)
    }

    /// Extract `data` for `url`, replacing any previous extraction, and
    /// return the archive root.
    ///
    /// Every call stages into its own temporary directory and moves it into
    /// place once the whole archive has been extracted. When a concurrent
    /// call for the same URL finishes first, its extraction is kept.
    pub fn unpack(&self, url: &Url, data: &[u8]) -> Result<PathBuf, ArchiveError> {
        let dest = self.extract_dir(url);
        let hash = hash_url(url);

        std::fs::create_dir_all(&self.cache_dir).map_err(ArchiveError::io(&self.cache_dir))?;

        // Removed on drop, including on extraction failure
        let staging = tempfile::Builder::new()
            .prefix(&format!("{}.", hash))
            .suffix(".partial")
            .tempdir_in(&self.cache_dir)
            .map_err(ArchiveError::io(&self.cache_dir))?;

        extract(data, staging.path())?;
        let root = match resolve_root(staging.path())?.strip_prefix(staging.path()) {
            Ok(relative) if !relative.as_os_str().is_empty() => dest.join(relative),
            _ => dest.clone(),
        };

        let mut attempts = 0;
        loop {
            self.discard(&dest, &hash)?;
            match std::fs::rename(staging.path(), &dest) {
                Ok(()) => {
                    tracing::trace!(%url, dir = %dest.display(), "archive extracted");
                    break;
                }
                Err(_) if dest.is_dir() => {
                    tracing::debug!(%url, dir = %dest.display(), "archive extracted concurrently, keeping it");
                    break;
                }
                Err(_) if attempts < PLACE_ATTEMPTS => attempts += 1,
                Err(err) => return Err(ArchiveError::io(&dest)(err)),
            }
        }

        Ok(root)
    }

    /// Move a previous extraction out of the way and delete it.
    ///
    /// Only one of several concurrent callers gets to rename the tree away;
    /// the others see it gone and carry on.
    fn discard(&self, dest: &Path, hash: &str) -> Result<(), ArchiveError> {
        if !dest.exists() {
            return Ok(());
        }

        let trash = tempfile::Builder::new()
            .prefix(&format!("{}.", hash))
            .suffix(".stale")
            .tempdir_in(&self.cache_dir)
            .map_err(ArchiveError::io(&self.cache_dir))?;

        match std::fs::rename(dest, trash.path().join("previous")) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ArchiveError::io(dest)(err)),
        }
    }
}

/// Extract a zip archive to a directory
fn extract(data: &[u8], dest: &Path) -> Result<(), ArchiveError> {
    std::fs::create_dir_all(dest).map_err(ArchiveError::io(dest))?;

    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;

        // Skip entries that would escape the destination
        let outpath = match file.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                tracing::warn!(entry = file.name(), "skipping unsafe archive entry");
                continue;
            }
        };

        if file.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(ArchiveError::io(&outpath))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(ArchiveError::io(parent))?;
        }

        let mut outfile = std::fs::File::create(&outpath).map_err(ArchiveError::io(&outpath))?;
        std::io::copy(&mut file, &mut outfile).map_err(ArchiveError::io(&outpath))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode)).ok();
            }
        }
    }

    Ok(())
}

/// Resolve the metadata root of an extracted archive.
///
/// A directory whose only entry is itself a directory resolves to that
/// entry (GitHub zipballs wrap everything in `<owner>-<repo>-<sha>/`).
pub fn resolve_root(dir: &Path) -> Result<PathBuf, ArchiveError> {
    let mut entries = std::fs::read_dir(dir)
        .map_err(ArchiveError::io(dir))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(ArchiveError::io(dir))?;

    if entries.len() == 1 {
        let entry = entries.remove(0);
        let is_dir = entry
            .file_type()
            .map_err(ArchiveError::io(entry.path()))?
            .is_dir();
        if is_dir {
            return Ok(entry.path());
        }
    }

    Ok(dir.to_path_buf())
}

/// Cache key for an archive URL
fn hash_url(url: &Url) -> String {
    let hash = blake3::hash(url.as_str().as_bytes());
    // First 16 bytes (32 hex chars)
    hash.to_hex()[..32].to_string()
}
