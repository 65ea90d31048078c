use camino::Utf8PathBuf;
use serde::Serialize;

use crate::bunch::Bunch;
use crate::cache::FetchCache;
use crate::dataset::Dataset;
use crate::error::GeoDatasetsError;

/// Extension preferred when an archive unpacks to several files.
pub const SHAPEFILE_EXTENSION: &str = ".shp";

/// Resolves loosely formatted dataset names against a catalog and hands the
/// byte-level work to a [`FetchCache`].
#[derive(Clone)]
pub struct GeoDatasets<'a, C: FetchCache> {
    catalog: &'a Bunch,
    cache: C,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedDataset {
    pub query: String,
    pub name: String,
    pub url: String,
    pub filename: String,
    pub path: Option<String>,
}

impl<'a, C: FetchCache> GeoDatasets<'a, C> {
    pub fn new(catalog: &'a Bunch, cache: C) -> Self {
        Self { catalog, cache }
    }

    pub fn catalog(&self) -> &'a Bunch {
        self.catalog
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn query_name(&self, query: &str) -> Result<&'a Dataset, GeoDatasetsError> {
        self.catalog.query_name(query)
    }

    /// The URL the dataset is downloaded from. Nothing is fetched.
    pub fn get_url(&self, query: &str) -> Result<&'a str, GeoDatasetsError> {
        Ok(self.query_name(query)?.url())
    }

    /// The absolute local path of the dataset, downloading it first when
    /// it is not cached yet.
    ///
    /// For archives with declared members the archive is unpacked; a single
    /// extracted file is returned as is, otherwise the first `.shp` file.
    pub fn get_path(&self, query: &str) -> Result<Utf8PathBuf, GeoDatasetsError> {
        let dataset = self.query_name(query)?;
        let Some(members) = dataset.members() else {
            return self.ensure_file(query, dataset);
        };

        let mut files = self.ensure_unpacked(query, dataset, &members)?;
        match files.len() {
            1 => Ok(files.remove(0)),
            _ => files
                .into_iter()
                .find(|path| path.as_str().ends_with(SHAPEFILE_EXTENSION))
                .ok_or_else(|| GeoDatasetsError::NoMatchingMember {
                    query: query.to_string(),
                    filename: dataset.filename().to_string(),
                }),
        }
    }

    /// Downloads every named dataset in order, stopping at the first failure.
    pub fn fetch<I, S>(&self, queries: I) -> Result<(), GeoDatasetsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for query in queries {
            let query = query.as_ref();
            let dataset = self.query_name(query)?;
            match dataset.members() {
                Some(members) => {
                    self.ensure_unpacked(query, dataset, &members)?;
                }
                None => {
                    self.ensure_file(query, dataset)?;
                }
            }
        }
        Ok(())
    }

    /// Resolves `query` and, when `with_path` is set, its local path.
    pub fn resolve(&self, query: &str, with_path: bool) -> Result<ResolvedDataset, GeoDatasetsError> {
        let dataset = self.query_name(query)?;
        let path = if with_path {
            Some(self.get_path(query)?.to_string())
        } else {
            None
        };
        Ok(ResolvedDataset {
            query: query.to_string(),
            name: dataset.name().to_string(),
            url: dataset.url().to_string(),
            filename: dataset.filename().to_string(),
            path,
        })
    }

    fn ensure_file(&self, query: &str, dataset: &Dataset) -> Result<Utf8PathBuf, GeoDatasetsError> {
        tracing::debug!(query, name = dataset.name(), "ensuring dataset is cached");
        self.cache
            .ensure_cached(dataset.filename(), dataset.hash(), dataset.url())
    }

    fn ensure_unpacked(
        &self,
        query: &str,
        dataset: &Dataset,
        members: &[&str],
    ) -> Result<Vec<Utf8PathBuf>, GeoDatasetsError> {
        tracing::debug!(query, name = dataset.name(), ?members, "ensuring archive is unpacked");
        self.cache.ensure_cached_and_unpack(
            dataset.filename(),
            dataset.hash(),
            dataset.url(),
            members,
        )
    }
}
