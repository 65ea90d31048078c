//! The catalog tree: nested groups of datasets.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::domain::{GeometryType, normalize_name};
use crate::error::GeoDatasetsError;

/// A child of a [`Bunch`]: either a nested group or a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Dataset(Dataset),
    Bunch(Bunch),
}

impl Node {
    pub fn as_dataset(&self) -> Option<&Dataset> {
        match self {
            Node::Dataset(dataset) => Some(dataset),
            Node::Bunch(_) => None,
        }
    }

    pub fn as_bunch(&self) -> Option<&Bunch> {
        match self {
            Node::Bunch(bunch) => Some(bunch),
            Node::Dataset(_) => None,
        }
    }
}

impl From<Dataset> for Node {
    fn from(value: Dataset) -> Self {
        Node::Dataset(value)
    }
}

impl From<Bunch> for Node {
    fn from(value: Bunch) -> Self {
        Node::Bunch(value)
    }
}

/// An ordered group of named children, keyed by their short local name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Bunch {
    children: IndexMap<String, Node>,
}

impl Bunch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<Node>) {
        self.children.insert(key.into(), node.into());
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.children.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of datasets reachable from this group.
    pub fn dataset_count(&self) -> usize {
        self.children
            .values()
            .map(|node| match node {
                Node::Dataset(_) => 1,
                Node::Bunch(bunch) => bunch.dataset_count(),
            })
            .sum()
    }

    /// Collapses the tree into one level keyed by each dataset's `name`.
    ///
    /// Children are visited depth-first in insertion order. When two
    /// datasets share a name the one visited last is kept.
    pub fn flatten(&self) -> IndexMap<&str, &Dataset> {
        self.datasets()
            .into_iter()
            .map(|dataset| (dataset.name(), dataset))
            .collect()
    }

    /// Every dataset in the tree, depth-first in insertion order.
    pub fn datasets(&self) -> Vec<&Dataset> {
        let mut datasets = Vec::new();
        self.collect_datasets(&mut datasets);
        datasets
    }

    fn collect_datasets<'a>(&'a self, datasets: &mut Vec<&'a Dataset>) {
        for node in self.children.values() {
            match node {
                Node::Dataset(dataset) => datasets.push(dataset),
                Node::Bunch(bunch) => bunch.collect_datasets(datasets),
            }
        }
    }

    /// Names of datasets that shadow an earlier dataset, either with the
    /// same name or one that normalizes identically. Lookups resolve to the
    /// later entry.
    pub fn name_collisions(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.datasets()
            .into_iter()
            .filter(|dataset| !seen.insert(normalize_name(dataset.name())))
            .map(Dataset::name)
            .collect()
    }

    /// Returns the dataset whose name matches `query` once both are
    /// normalized with [`normalize_name`].
    pub fn query_name(&self, query: &str) -> Result<&Dataset, GeoDatasetsError> {
        let index = self
            .flatten()
            .into_values()
            .map(|dataset| (normalize_name(dataset.name()), dataset))
            .collect::<HashMap<_, _>>();

        index
            .get(&normalize_name(query))
            .copied()
            .ok_or_else(|| GeoDatasetsError::NotFound {
                query: query.to_string(),
            })
    }

    /// Returns a copy of the tree holding only datasets accepted by
    /// `filter`. Groups left empty are dropped.
    pub fn filter(&self, filter: &DatasetFilter) -> Bunch {
        self.filter_by(&|dataset: &Dataset| filter.matches(dataset))
    }

    /// Like [`Bunch::filter`] with an arbitrary predicate.
    pub fn filter_by(&self, predicate: &dyn Fn(&Dataset) -> bool) -> Bunch {
        let mut filtered = Bunch::new();
        for (key, node) in &self.children {
            match node {
                Node::Dataset(dataset) => {
                    if predicate(dataset) {
                        filtered.insert(key.clone(), dataset.clone());
                    }
                }
                Node::Bunch(bunch) => {
                    let child = bunch.filter_by(predicate);
                    if !child.is_empty() {
                        filtered.insert(key.clone(), child);
                    }
                }
            }
        }
        filtered
    }
}

impl<'a> IntoIterator for &'a Bunch {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

type Predicate = Arc<dyn Fn(&Dataset) -> bool + Send + Sync>;

/// Conditions a dataset must satisfy to survive [`Bunch::filter`].
///
/// All supplied conditions must hold. A custom `function` replaces the
/// keyword, name and geometry type conditions entirely.
#[derive(Clone, Default)]
pub struct DatasetFilter {
    keyword: Option<String>,
    name: Option<String>,
    geometry_type: Option<String>,
    function: Option<Predicate>,
}

impl DatasetFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring of any string attribute.
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Case-insensitive substring of the dataset name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Geometry type such as `"Point"` or `"line-string"`. A value that is
    /// not a known [`GeometryType`] matches nothing.
    pub fn geometry_type(mut self, geometry_type: impl Into<String>) -> Self {
        self.geometry_type = Some(geometry_type.into());
        self
    }

    pub fn function<F>(mut self, function: F) -> Self
    where
        F: Fn(&Dataset) -> bool + Send + Sync + 'static,
    {
        self.function = Some(Arc::new(function));
        self
    }

    pub fn matches(&self, dataset: &Dataset) -> bool {
        if let Some(function) = &self.function {
            return function(dataset);
        }

        if let Some(keyword) = &self.keyword {
            let keyword = keyword.to_lowercase();
            let found = dataset
                .string_values()
                .any(|value| value.to_lowercase().contains(&keyword));
            if !found {
                return false;
            }
        }

        if let Some(name) = &self.name
            && !dataset.name().to_lowercase().contains(&name.to_lowercase())
        {
            return false;
        }

        if let Some(geometry_type) = &self.geometry_type {
            let Ok(wanted) = geometry_type.parse::<GeometryType>() else {
                return false;
            };
            let found = dataset
                .geometry_type()
                .is_ok_and(|value| value.to_uppercase() == wanted.as_str());
            if !found {
                return false;
            }
        }

        true
    }
}

impl fmt::Debug for DatasetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetFilter")
            .field("keyword", &self.keyword)
            .field("name", &self.name)
            .field("geometry_type", &self.geometry_type)
            .field("function", &self.function.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn dataset(value: Value) -> Dataset {
        Dataset::new(value.as_object().cloned().unwrap()).unwrap()
    }

    fn record(name: &str, geometry: &str) -> Dataset {
        dataset(json!({
            "name": name,
            "url": format!("https://example.org/{name}.zip"),
            "hash": "sha256:00",
            "filename": format!("{name}.zip"),
            "geometry_type": geometry,
        }))
    }

    #[test]
    fn flatten_keeps_last_duplicate() {
        let mut first = Bunch::new();
        first.insert("a", record("dup", "Point"));
        let mut bunch = Bunch::new();
        bunch.insert("first", first);
        bunch.insert("second", record("dup", "Polygon"));

        let flat = bunch.flatten();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["dup"].geometry_type().unwrap(), "Polygon");
    }

    #[test]
    fn filter_prunes_empty_groups() {
        let mut group = Bunch::new();
        group.insert("lines", record("g.lines", "LineString"));
        let mut bunch = Bunch::new();
        bunch.insert("g", group);
        bunch.insert("pts", record("pts", "Point"));

        let filtered = bunch.filter(&DatasetFilter::new().geometry_type("point"));
        assert_eq!(filtered.len(), 1);
        assert!(filtered.get("g").is_none());
        assert!(filtered.get("pts").is_some());
    }

    #[test]
    fn function_takes_precedence() {
        let filter = DatasetFilter::new()
            .name("no-such-name")
            .function(|dataset| dataset.name() == "pts");
        assert!(filter.matches(&record("pts", "Point")));
    }

    #[test]
    fn geometry_condition_rejects_datasets_without_geometry() {
        let bare = dataset(json!({
            "name": "bare",
            "url": "u",
            "hash": "h",
            "filename": "f"
        }));
        assert!(!DatasetFilter::new().geometry_type("Point").matches(&bare));
        assert!(DatasetFilter::new().matches(&bare));
    }

    #[test]
    fn unknown_geometry_type_matches_nothing() {
        let filter = DatasetFilter::new().geometry_type("Raster");
        assert!(!filter.matches(&record("pts", "Point")));
        assert!(!filter.matches(&record("raster", "Raster")));
    }

    #[test]
    fn collisions_include_normalized_names() {
        let mut bunch = Bunch::new();
        bunch.insert("a", record("ab.c", "Point"));
        bunch.insert("b", record("a.bc", "Point"));
        bunch.insert("c", record("other", "Point"));
        bunch.insert("d", record("other", "Point"));
        assert_eq!(bunch.name_collisions(), vec!["a.bc", "other"]);
    }
}
