//! Reference index service for O(1) reference point lookups
//!
//! This module loads the reference point table (Lambert-93 positions keyed by
//! CI/CH codes) once and provides read-only access by composite identifier.

use crate::models::{CompositeKey, ReferenceRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub mod loader;
pub mod metadata;
pub mod parser;
pub mod query;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use metadata::LoadStats;

/// Reference points indexed by normalized composite identifier
///
/// Built once per process and never mutated afterwards; resolvers borrow it.
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    /// Records indexed by normalized (primary, secondary) key
    pub(crate) records: HashMap<CompositeKey, ReferenceRecord>,

    /// Reference table the index was built from
    pub(crate) source_path: PathBuf,

    /// When the index finished loading
    pub(crate) load_time: Instant,
}

impl ReferenceIndex {
    /// Create an empty index for the given source
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            records: HashMap::new(),
            source_path,
            load_time: Instant::now(),
        }
    }

    /// Build an index from in-memory records, keeping the first of any duplicate key
    pub fn from_records(records: impl IntoIterator<Item = ReferenceRecord>) -> Self {
        let mut index = Self::new(PathBuf::new());
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Insert a record unless its key is already present. Returns whether it was inserted.
    pub(crate) fn insert(&mut self, record: ReferenceRecord) -> bool {
        match self.records.entry(record.key()) {
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(record);
                true
            }
            std::collections::hash_map::Entry::Occupied(_) => false,
        }
    }

    /// Look up a record by identifier halves (case-insensitive)
    pub fn get(&self, primary: &str, secondary: &str) -> Option<&ReferenceRecord> {
        self.records.get(&CompositeKey::new(primary, secondary))
    }

    /// Look up a record by an already normalized key
    pub fn get_key(&self, key: &CompositeKey) -> Option<&ReferenceRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, primary: &str, secondary: &str) -> bool {
        self.get(primary, secondary).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn load_time(&self) -> Instant {
        self.load_time
    }
}
