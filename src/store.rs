use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::ProjectDirs;
use tempfile::{Builder, NamedTempFile};

use crate::config::ResolvedConfig;
use crate::error::GeoDatasetsError;

pub const APP_NAME: &str = "geodatasets";

/// Layout of the on-disk cache. Downloads are stored flat under the root;
/// archives are unpacked next to them in `<filename>.unzip`.
#[derive(Debug, Clone)]
pub struct Store {
    cache_root: Utf8PathBuf,
}

impl Store {
    /// Uses the configured cache directory, made absolute against the
    /// working directory, or the platform cache directory.
    pub fn new(config: &ResolvedConfig) -> Result<Self, GeoDatasetsError> {
        match &config.cache_dir {
            Some(dir) => Ok(Self::new_with_root(absolute_root(dir)?)),
            None => Self::platform(),
        }
    }

    /// The per-user cache directory of the platform.
    pub fn platform() -> Result<Self, GeoDatasetsError> {
        let cache_root = ProjectDirs::from("", "", APP_NAME)
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.cache_dir().to_path_buf()).ok())
            .ok_or_else(|| {
                GeoDatasetsError::Filesystem("unable to resolve cache directory".to_string())
            })?;
        Ok(Self { cache_root })
    }

    pub fn new_with_root(cache_root: Utf8PathBuf) -> Self {
        Self { cache_root }
    }

    pub fn cache_root(&self) -> &Utf8Path {
        &self.cache_root
    }

    pub fn file_path(&self, filename: &str) -> Utf8PathBuf {
        self.cache_root.join(filename)
    }

    pub fn unpack_dir(&self, filename: &str) -> Utf8PathBuf {
        self.cache_root.join(format!("{filename}.unzip"))
    }

    pub fn ensure_cache_root(&self) -> Result<(), GeoDatasetsError> {
        fs::create_dir_all(self.cache_root.as_std_path())
            .map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))
    }

    /// A temporary file inside the cache root, so that persisting it is a rename.
    pub fn temp_download(&self) -> Result<NamedTempFile, GeoDatasetsError> {
        self.ensure_cache_root()?;
        Builder::new()
            .prefix("geodatasets-download")
            .tempfile_in(self.cache_root.as_std_path())
            .map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))
    }

    pub fn persist(temp: NamedTempFile, dest: &Utf8Path) -> Result<(), GeoDatasetsError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent.as_std_path())
                .map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))?;
        }
        temp.persist(dest.as_std_path())
            .map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))?;
        Ok(())
    }

    pub fn remove_dir(path: &Utf8Path) -> Result<(), GeoDatasetsError> {
        if path.as_std_path().exists() {
            fs::remove_dir_all(path.as_std_path())
                .map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))?;
        }
        Ok(())
    }
}

fn absolute_root(dir: &Utf8Path) -> Result<Utf8PathBuf, GeoDatasetsError> {
    let absolute = std::path::absolute(dir.as_std_path())
        .map_err(|err| GeoDatasetsError::Filesystem(format!("resolve cache dir {dir}: {err}")))?;
    Utf8PathBuf::try_from(absolute)
        .map_err(|err| GeoDatasetsError::Filesystem(format!("non-utf8 cache dir: {err}")))
}
