//! Catalog parsing from JSON text or a local file

use std::fs;
use std::path::Path;

use crate::catalog::types::{Catalog, CatalogError};
use crate::tle::OrbitalElementRecord;

/// Parse a JSON array of element tuples.
pub fn parse_catalog(json: &str) -> Result<Catalog, CatalogError> {
    let records: Vec<OrbitalElementRecord> = serde_json::from_str(json)?;
    Ok(Catalog::new(records))
}

pub fn load_catalog_file(path: &Path) -> Result<Catalog, CatalogError> {
    let contents = fs::read_to_string(path)?;
    parse_catalog(&contents)
}
