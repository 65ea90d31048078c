//! Builds the catalog tree from its JSON definition.

use std::fs;
use std::sync::OnceLock;

use camino::Utf8Path;
use serde_json::{Map, Value};

use crate::bunch::{Bunch, Node};
use crate::dataset::{Dataset, REQUIRED_ATTRIBUTES};
use crate::error::GeoDatasetsError;

const BUNDLED_DEFINITION: &str = include_str!("../data/database.json");

static BUNDLED: OnceLock<Bunch> = OnceLock::new();

/// The catalog shipped with the crate, parsed on first use.
pub fn bundled() -> Result<&'static Bunch, GeoDatasetsError> {
    if let Some(bunch) = BUNDLED.get() {
        return Ok(bunch);
    }
    let bunch = load_json(BUNDLED_DEFINITION)?;
    Ok(BUNDLED.get_or_init(|| bunch))
}

pub fn load_path(path: &Utf8Path) -> Result<Bunch, GeoDatasetsError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| GeoDatasetsError::Filesystem(format!("read catalog {path}: {err}")))?;
    load_json(&content)
}

/// Parses a catalog definition. An object holding any of the required
/// dataset attributes is a dataset; any other object is a group whose
/// entries are loaded the same way.
pub fn load_json(definition: &str) -> Result<Bunch, GeoDatasetsError> {
    let root: Value = serde_json::from_str(definition)
        .map_err(|err| GeoDatasetsError::CatalogParse(err.to_string()))?;
    let Value::Object(entries) = root else {
        return Err(GeoDatasetsError::CatalogFormat {
            key: "<root>".to_string(),
            reason: "expected a JSON object".to_string(),
        });
    };
    let bunch = load_group(entries, None)?;
    for name in bunch.name_collisions() {
        tracing::warn!(name, "dataset name collides with an earlier entry; lookups use the later one");
    }
    Ok(bunch)
}

fn load_group(entries: Map<String, Value>, parent: Option<&str>) -> Result<Bunch, GeoDatasetsError> {
    let mut bunch = Bunch::new();
    for (key, value) in entries {
        let path = match parent {
            Some(parent) => format!("{parent}.{key}"),
            None => key.clone(),
        };
        let Value::Object(object) = value else {
            return Err(GeoDatasetsError::CatalogFormat {
                key: path,
                reason: "expected a dataset or a group of datasets".to_string(),
            });
        };
        let is_dataset = REQUIRED_ATTRIBUTES
            .iter()
            .any(|attribute| object.contains_key(*attribute));
        let node = if is_dataset {
            Node::Dataset(Dataset::new(object).map_err(|err| with_location(err, &path))?)
        } else {
            Node::Bunch(load_group(object, Some(&path))?)
        };
        bunch.insert(key, node);
    }
    Ok(bunch)
}

// Unnamed entries are reported by their position in the definition.
fn with_location(err: GeoDatasetsError, path: &str) -> GeoDatasetsError {
    match err {
        GeoDatasetsError::Validation { dataset, missing } if dataset == "<unnamed>" => {
            GeoDatasetsError::Validation {
                dataset: path.to_string(),
                missing,
            }
        }
        other => other,
    }
}
