//! Catalog resource and query surface

use bevy::prelude::*;
use thiserror::Error;

use crate::tle::OrbitalElementRecord;

/// Default size of the search result list.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;
/// Queries shorter than this produce no result list.
pub const MIN_SEARCH_QUERY_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog io: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One search hit.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub index: usize,
    pub id: u32,
    pub name: String,
}

/// All tracked objects, in load order. Index `i` is the handle used by the
/// position buffer, the instance batch, and selection.
#[derive(Resource, Default, Debug, Clone)]
pub struct Catalog {
    records: Vec<OrbitalElementRecord>,
}

impl Catalog {
    pub fn new(records: Vec<OrbitalElementRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OrbitalElementRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[OrbitalElementRecord] {
        &self.records
    }

    /// First record whose id equals `query` exactly or whose name contains
    /// it, ignoring case.
    pub fn search_first(&self, query: &str) -> Option<usize> {
        let needle = query.to_lowercase();
        self.records
            .iter()
            .position(|r| r.id.to_string() == query || r.name.to_lowercase().contains(&needle))
    }

    /// Up to `limit` records whose id or name contains `query`, in catalog order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        if query.chars().count() < MIN_SEARCH_QUERY_LEN {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.id.to_string().contains(&needle) || r.name.to_lowercase().contains(&needle)
            })
            .take(limit)
            .map(|(index, r)| SearchHit {
                index,
                id: r.id,
                name: r.name.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::types::fixtures;

    fn sample() -> Catalog {
        Catalog::new(vec![
            fixtures::iss(),
            fixtures::with_mean_motion(44713, "STARLINK-1007", 15.06),
            fixtures::with_mean_motion(44714, "STARLINK-1008", 15.06),
            fixtures::with_mean_motion(28474, "GPS BIIR-13", 2.0056),
        ])
    }

    #[test]
    fn test_search_first_by_exact_id_and_name() {
        let cat = sample();
        assert_eq!(cat.search_first("25544"), Some(0));
        assert_eq!(cat.search_first("starlink"), Some(1));
        assert_eq!(cat.search_first("gps"), Some(3));
        assert_eq!(cat.search_first("nothing here"), None);
    }

    #[test]
    fn test_search_first_id_must_match_exactly() {
        let cat = sample();
        // "4471" is a prefix of two ids but no name contains it
        assert_eq!(cat.search_first("4471"), None);
    }

    #[test]
    fn test_search_matches_id_substring_and_respects_limit() {
        let cat = sample();
        let hits = cat.search("4471", DEFAULT_SEARCH_LIMIT);
        assert_eq!(
            hits.iter().map(|h| h.index).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(cat.search("starlink", 1).len(), 1);
        assert_eq!(cat.search("STAR", 5)[0].name, "STARLINK-1007");
    }

    #[test]
    fn test_search_ignores_short_queries() {
        let cat = sample();
        assert!(cat.search("s", 5).is_empty());
        assert!(cat.search("", 5).is_empty());
    }

    #[test]
    fn test_get_out_of_range() {
        let cat = sample();
        assert_eq!(cat.get(0).map(|r| r.id), Some(25544));
        assert!(cat.get(4).is_none());
    }
}
