//! The fetch-and-cache collaborator: downloads, verifies and unpacks files
//! on demand under a persistent cache root.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::KnownHash;
use crate::error::GeoDatasetsError;
use crate::fetcher::Downloader;
use crate::fs_util;
use crate::integrity;
use crate::store::Store;

/// Contract the catalog facade relies on to obtain verified local files.
pub trait FetchCache {
    /// Returns the local path of `filename`, downloading it from `url` when
    /// it is absent or does not match `known_hash`.
    fn ensure_cached(
        &self,
        filename: &str,
        known_hash: &str,
        url: &str,
    ) -> Result<Utf8PathBuf, GeoDatasetsError>;

    /// As [`FetchCache::ensure_cached`], then extracts `members` from the
    /// archive and returns their local paths.
    fn ensure_cached_and_unpack(
        &self,
        filename: &str,
        known_hash: &str,
        url: &str,
        members: &[&str],
    ) -> Result<Vec<Utf8PathBuf>, GeoDatasetsError>;
}

impl<C: FetchCache> FetchCache for &C {
    fn ensure_cached(
        &self,
        filename: &str,
        known_hash: &str,
        url: &str,
    ) -> Result<Utf8PathBuf, GeoDatasetsError> {
        (**self).ensure_cached(filename, known_hash, url)
    }

    fn ensure_cached_and_unpack(
        &self,
        filename: &str,
        known_hash: &str,
        url: &str,
        members: &[&str],
    ) -> Result<Vec<Utf8PathBuf>, GeoDatasetsError> {
        (**self).ensure_cached_and_unpack(filename, known_hash, url, members)
    }
}

/// What had to happen to make a file available locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Already present with the right digest.
    Fetch,
    /// Present with a different digest; downloaded again.
    Update,
    Download,
}

impl fmt::Display for CacheAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheAction::Fetch => write!(f, "fetch"),
            CacheAction::Update => write!(f, "update"),
            CacheAction::Download => write!(f, "download"),
        }
    }
}

#[derive(Clone)]
pub struct DiskCache<D: Downloader> {
    store: Store,
    downloader: D,
}

impl<D: Downloader> DiskCache<D> {
    pub fn new(store: Store, downloader: D) -> Self {
        Self { store, downloader }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    /// Makes `filename` available and reports what was done to get it.
    pub fn fetch_file(
        &self,
        filename: &str,
        known_hash: &str,
        url: &str,
    ) -> Result<(Utf8PathBuf, CacheAction), GeoDatasetsError> {
        let known: KnownHash = known_hash.parse()?;
        let path = self.store.file_path(filename);

        let action = if !path.as_std_path().exists() {
            CacheAction::Download
        } else if integrity::matches(path.as_std_path(), &known)? {
            tracing::debug!(%path, "cache hit");
            return Ok((path, CacheAction::Fetch));
        } else {
            tracing::warn!(%path, "cached file does not match its known hash");
            CacheAction::Update
        };

        tracing::info!(filename, url, cache = %self.store.cache_root(), "downloading");
        let temp = self.store.temp_download()?;
        self.downloader.download(url, temp.path())?;
        integrity::verify(temp.path(), &known, filename)?;
        Store::persist(temp, &path)?;
        Ok((path, action))
    }

    fn unpack(
        &self,
        archive: &Utf8Path,
        filename: &str,
        action: CacheAction,
        members: &[&str],
    ) -> Result<Vec<Utf8PathBuf>, GeoDatasetsError> {
        let extract_dir = self.store.unpack_dir(filename);
        if action == CacheAction::Fetch {
            if let Some(existing) = existing_members(&extract_dir, members) {
                tracing::debug!(%extract_dir, "archive already unpacked");
                return Ok(existing);
            }
        } else {
            Store::remove_dir(&extract_dir)?;
        }

        tracing::info!(%archive, %extract_dir, "unpacking archive");
        fs_util::validate_zip(archive.as_std_path())?;
        fs_util::extract_members(archive.as_std_path(), extract_dir.as_std_path(), members)?
            .into_iter()
            .map(|path| {
                Utf8PathBuf::from_path_buf(path).map_err(|_| {
                    GeoDatasetsError::Filesystem("non-utf8 file path in archive".to_string())
                })
            })
            .collect()
    }
}

impl<D: Downloader> FetchCache for DiskCache<D> {
    fn ensure_cached(
        &self,
        filename: &str,
        known_hash: &str,
        url: &str,
    ) -> Result<Utf8PathBuf, GeoDatasetsError> {
        self.fetch_file(filename, known_hash, url)
            .map(|(path, _)| path)
    }

    fn ensure_cached_and_unpack(
        &self,
        filename: &str,
        known_hash: &str,
        url: &str,
        members: &[&str],
    ) -> Result<Vec<Utf8PathBuf>, GeoDatasetsError> {
        let (archive, action) = self.fetch_file(filename, known_hash, url)?;
        self.unpack(&archive, filename, action, members)
    }
}

// Directory members cannot be checked without re-reading the archive.
fn existing_members(extract_dir: &Utf8Path, members: &[&str]) -> Option<Vec<Utf8PathBuf>> {
    if members.is_empty() || members.iter().any(|member| member.ends_with('/')) {
        return None;
    }
    let paths = members
        .iter()
        .map(|member| extract_dir.join(member))
        .collect::<Vec<_>>();
    paths
        .iter()
        .all(|path| path.as_std_path().is_file())
        .then_some(paths)
}
