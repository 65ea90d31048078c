use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::GeoDatasetsError;

pub const DEFAULT_CONFIG_FILE: &str = "geodatasets.json";
pub const CACHE_DIR_ENV: &str = "GEODATASETS_CACHE_DIR";
pub const CATALOG_ENV: &str = "GEODATASETS_CATALOG";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_RETRIES: usize = 3;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub cache_dir: Option<String>,
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    /// `None` means the platform cache directory.
    pub cache_dir: Option<Utf8PathBuf>,
    /// `None` means the bundled catalog.
    pub catalog: Option<Utf8PathBuf>,
    pub timeout_secs: u64,
    pub max_retries: usize,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            cache_dir: None,
            catalog: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `path`, or `geodatasets.json` in the working directory when it
    /// exists, then applies environment overrides.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, GeoDatasetsError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config = if path.is_none() && !config_path.exists() {
            Config::default()
        } else {
            let content = fs::read_to_string(&config_path)
                .map_err(|_| GeoDatasetsError::ConfigRead(config_path.clone()))?;
            serde_json::from_str(&content)
                .map_err(|err| GeoDatasetsError::ConfigParse(err.to_string()))?
        };

        let mut resolved = Self::resolve_config(config);
        Self::apply_env(&mut resolved, |key| std::env::var(key).ok());
        Ok(resolved)
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        let defaults = ResolvedConfig::default();
        ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(defaults.schema_version),
            cache_dir: non_empty(config.cache_dir).map(Utf8PathBuf::from),
            catalog: non_empty(config.catalog).map(Utf8PathBuf::from),
            timeout_secs: config.timeout_secs.unwrap_or(defaults.timeout_secs),
            max_retries: config.max_retries.unwrap_or(defaults.max_retries),
        }
    }

    pub fn apply_env<F>(resolved: &mut ResolvedConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = non_empty(lookup(CACHE_DIR_ENV)) {
            resolved.cache_dir = Some(Utf8PathBuf::from(dir));
        }
        if let Some(catalog) = non_empty(lookup(CATALOG_ENV)) {
            resolved.catalog = Some(Utf8PathBuf::from(catalog));
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
