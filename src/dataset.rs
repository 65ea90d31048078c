//! A single downloadable dataset and its attributes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GeoDatasetsError;

/// Attributes every dataset must carry, in the order they are reported.
pub const REQUIRED_ATTRIBUTES: [&str; 4] = ["name", "url", "hash", "filename"];

/// Metadata for one downloadable dataset.
///
/// The attributes are kept as an ordered JSON object so that catalog
/// authors can add descriptive fields without a schema change. The four
/// required attributes are checked once, at construction, and are always
/// strings afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Dataset {
    attributes: Map<String, Value>,
}

impl Dataset {
    /// Validates `attributes` and wraps them. Every missing required
    /// attribute is reported, not only the first one.
    pub fn new(attributes: Map<String, Value>) -> Result<Self, GeoDatasetsError> {
        let label = attributes
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();

        let missing = REQUIRED_ATTRIBUTES
            .iter()
            .filter(|key| !attributes.contains_key(**key))
            .map(|key| key.to_string())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(GeoDatasetsError::Validation {
                dataset: label,
                missing,
            });
        }

        for key in REQUIRED_ATTRIBUTES {
            if !attributes.get(key).is_some_and(Value::is_string) {
                return Err(GeoDatasetsError::InvalidAttribute {
                    dataset: label,
                    attribute: key.to_string(),
                    reason: "expected a string".to_string(),
                });
            }
        }

        if let Some(members) = attributes.get("members") {
            let valid = members
                .as_array()
                .map(|items| items.iter().all(Value::is_string))
                .unwrap_or(false);
            if !valid {
                return Err(GeoDatasetsError::InvalidAttribute {
                    dataset: label,
                    attribute: "members".to_string(),
                    reason: "expected an array of file names".to_string(),
                });
            }
        }

        Ok(Self { attributes })
    }

    /// Returns a new dataset with `changes` merged over a copy of this one.
    pub fn with_overrides(&self, changes: Map<String, Value>) -> Result<Self, GeoDatasetsError> {
        let mut attributes = self.attributes.clone();
        attributes.extend(changes);
        Self::new(attributes)
    }

    pub fn name(&self) -> &str {
        self.required("name")
    }

    pub fn url(&self) -> &str {
        self.required("url")
    }

    pub fn hash(&self) -> &str {
        self.required("hash")
    }

    pub fn filename(&self) -> &str {
        self.required("filename")
    }

    /// Files to extract when the download is an archive.
    pub fn members(&self) -> Option<Vec<&str>> {
        self.attributes
            .get("members")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
    }

    pub fn geometry_type(&self) -> Result<&str, GeoDatasetsError> {
        self.str_attribute("geometry_type")
    }

    pub fn nrows(&self) -> Result<u64, GeoDatasetsError> {
        self.u64_attribute("nrows")
    }

    pub fn ncols(&self) -> Result<u64, GeoDatasetsError> {
        self.u64_attribute("ncols")
    }

    pub fn attribution(&self) -> Result<&str, GeoDatasetsError> {
        self.str_attribute("attribution")
    }

    /// The HTML attribution, or the plain one when no HTML variant exists.
    pub fn html_attribution(&self) -> Result<&str, GeoDatasetsError> {
        match self.attributes.get("html_attribution").and_then(Value::as_str) {
            Some(value) => Ok(value),
            None => self.attribution(),
        }
    }

    pub fn description(&self) -> Result<&str, GeoDatasetsError> {
        self.str_attribute("description")
    }

    pub fn details(&self) -> Result<&str, GeoDatasetsError> {
        self.str_attribute("details")
    }

    pub fn license(&self) -> Result<&str, GeoDatasetsError> {
        self.str_attribute("license")
    }

    /// Looks up any attribute, failing with `MissingAttribute` when absent.
    pub fn attribute(&self, key: &str) -> Result<&Value, GeoDatasetsError> {
        self.attributes
            .get(key)
            .ok_or_else(|| self.missing(key))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Every string-valued attribute, in definition order.
    pub fn string_values(&self) -> impl Iterator<Item = &str> {
        self.attributes.values().filter_map(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.attributes
    }

    fn required(&self, key: &str) -> &str {
        // Checked in `new`.
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    fn str_attribute(&self, key: &str) -> Result<&str, GeoDatasetsError> {
        let value = self.attribute(key)?;
        value.as_str().ok_or_else(|| GeoDatasetsError::InvalidAttribute {
            dataset: self.name().to_string(),
            attribute: key.to_string(),
            reason: format!("expected a string, found {value}"),
        })
    }

    fn u64_attribute(&self, key: &str) -> Result<u64, GeoDatasetsError> {
        let value = self.attribute(key)?;
        value.as_u64().ok_or_else(|| GeoDatasetsError::InvalidAttribute {
            dataset: self.name().to_string(),
            attribute: key.to_string(),
            reason: format!("expected a non-negative integer, found {value}"),
        })
    }

    fn missing(&self, key: &str) -> GeoDatasetsError {
        GeoDatasetsError::MissingAttribute {
            dataset: self.name().to_string(),
            attribute: key.to_string(),
        }
    }
}

impl TryFrom<Map<String, Value>> for Dataset {
    type Error = GeoDatasetsError;

    fn try_from(value: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Dataset> for Map<String, Value> {
    fn from(value: Dataset) -> Self {
        value.attributes
    }
}
