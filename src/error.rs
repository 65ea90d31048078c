use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GeoDatasetsError {
    #[error(
        "the attributes `name`, `url`, `hash` and `filename` are required to initialise a dataset; \
         '{dataset}' is missing: `{}`",
        missing.join("`, `")
    )]
    Validation {
        dataset: String,
        missing: Vec<String>,
    },

    #[error("invalid attribute `{attribute}` on dataset '{dataset}': {reason}")]
    InvalidAttribute {
        dataset: String,
        attribute: String,
        reason: String,
    },

    #[error("dataset '{dataset}' has no attribute `{attribute}`")]
    MissingAttribute { dataset: String, attribute: String },

    #[error("No matching item found for the query '{query}'.")]
    #[diagnostic(help(
        "names are matched ignoring case and the characters `. , - _ /` and space; \
         pass --catalog or set GEODATASETS_CATALOG to search another definition"
    ))]
    NotFound { query: String },

    #[error("no file in archive '{filename}' matched the query '{query}' (expected a single file or a `.shp` member)")]
    NoMatchingMember { query: String, filename: String },

    #[error("archive {archive} has no member named '{member}'")]
    ArchiveMemberMissing { archive: String, member: String },

    #[error("hash mismatch for '{filename}': expected {expected}, got {actual}")]
    Integrity {
        filename: String,
        expected: String,
        actual: String,
    },

    #[error("invalid known hash: {0}")]
    InvalidHash(String),

    #[error("failed to parse catalog definition: {0}")]
    CatalogParse(String),

    #[error("malformed catalog entry '{key}': {reason}")]
    CatalogFormat { key: String, reason: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("download failed: {0}")]
    Http(String),

    #[error("download of {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
