use std::io::{self, Write};

use serde::Serialize;

use crate::app::ResolvedDataset;
use crate::bunch::Bunch;
use crate::dataset::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub fetched: Vec<String>,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_resolved(result: &ResolvedDataset) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_dataset(dataset: &Dataset) -> io::Result<()> {
        Self::print_json(dataset)
    }

    pub fn print_catalog(catalog: &Bunch) -> io::Result<()> {
        Self::print_json(catalog)
    }

    pub fn print_fetch(result: &FetchResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
