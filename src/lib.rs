//! A catalog of open geospatial datasets with fuzzy name lookup, backed by
//! a local cache that downloads, verifies and unpacks files on demand.
//!
//! The bundled definition only carries entries whose digests have been
//! checked; other catalogs are loaded with [`catalog::load_path`].
//!
//! ```no_run
//! use camino::Utf8Path;
//! use geodatasets::{DiskCache, GeoDatasets, HttpDownloader, ResolvedConfig, Store, catalog};
//!
//! # fn main() -> Result<(), geodatasets::GeoDatasetsError> {
//! let config = ResolvedConfig::default();
//! let definition = catalog::load_path(Utf8Path::new("catalog.json"))?;
//! let cache = DiskCache::new(Store::new(&config)?, HttpDownloader::new(&config)?);
//! let datasets = GeoDatasets::new(&definition, cache);
//!
//! let url = datasets.get_url("GeoDa AirBnB")?;
//! let path = datasets.get_path("nybb")?;
//! # let _ = (url, path);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod bunch;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod fs_util;
pub mod integrity;
pub mod output;
pub mod render;
pub mod store;

pub use app::GeoDatasets;
pub use bunch::{Bunch, DatasetFilter, Node};
pub use cache::{DiskCache, FetchCache};
pub use config::{ConfigLoader, ResolvedConfig};
pub use dataset::Dataset;
pub use error::GeoDatasetsError;
pub use fetcher::{Downloader, HttpDownloader};
pub use store::Store;
