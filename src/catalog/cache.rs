//! Catalog disk cache
//!
//! Keeps the last downloaded catalog body so restarts within the expiration
//! window skip the network entirely.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CACHE_FILE: &str = "catalog.json";

/// Serialized cache entry stored as JSON on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedCatalog {
    pub url: String,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}

pub struct CatalogCache {
    cache_dir: PathBuf,
    expiration_days: i64,
}

impl CatalogCache {
    /// Cache under the platform cache dir, e.g. `~/.cache/bevyorbits/catalog/`.
    pub fn new(expiration_days: i64) -> Result<Self, anyhow::Error> {
        let proj_dirs = ProjectDirs::from("", "", "bevyorbits")
            .ok_or_else(|| anyhow::anyhow!("Failed to resolve cache directory"))?;
        Self::new_in_dir(proj_dirs.cache_dir().join("catalog"), expiration_days)
    }

    pub fn new_in_dir(cache_dir: PathBuf, expiration_days: i64) -> Result<Self, anyhow::Error> {
        fs::create_dir_all(&cache_dir)?;
        Ok(Self {
            cache_dir,
            expiration_days,
        })
    }

    /// `Ok(None)` on a miss; a cached body for a different URL is also a miss.
    pub fn read(&self, url: &str) -> Result<Option<CachedCatalog>, anyhow::Error> {
        let path = self.cache_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let cached: CachedCatalog = serde_json::from_str(&contents)?;
        Ok((cached.url == url).then_some(cached))
    }

    pub fn write(&self, entry: &CachedCatalog) -> Result<(), anyhow::Error> {
        let contents = serde_json::to_string(entry)?;
        fs::write(self.cache_path(), contents)?;
        Ok(())
    }

    pub fn is_valid(&self, entry: &CachedCatalog) -> bool {
        Utc::now().signed_duration_since(entry.fetched_at) < Duration::days(self.expiration_days)
    }

    fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE)
    }
}
