//! Static reference data consulted before any confirming network call.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Read-only membership and attribute lookup over a bulk dataset of known
/// entity identifiers.
///
/// The snapshot is decisive on rejection: an identifier it does not list,
/// or lists as unpublished, is invalid without any network call. An
/// identifier it accepts still gets a confirming live lookup, because the
/// snapshot may lag behind recently added entities.
pub trait ReferenceData: Send + Sync {
    /// Whether the dataset lists this identifier at all.
    fn contains(&self, id: u64) -> bool;

    /// The identifier's published flag, if listed.
    fn published(&self, id: u64) -> Option<bool>;
}

/// In-memory reference dataset, loaded once at startup.
#[derive(Debug, Default)]
pub struct StaticReferenceData {
    entries: HashMap<u64, bool>,
}

impl StaticReferenceData {
    /// Builds a dataset from `(id, published)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (u64, bool)>) -> Self {
        StaticReferenceData {
            entries: entries.into_iter().collect(),
        }
    }

    /// Loads a dataset from a JSON document mapping identifiers to their
    /// published flag.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let entries: HashMap<u64, bool> = serde_json::from_str(&raw)?;
        Ok(StaticReferenceData { entries })
    }

    /// Number of identifiers in the dataset.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReferenceData for StaticReferenceData {
    fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    fn published(&self, id: u64) -> Option<bool> {
        self.entries.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_and_published_flag() {
        let data = StaticReferenceData::from_entries([(34, true), (35, false)]);
        assert!(data.contains(34));
        assert_eq!(data.published(34), Some(true));
        assert_eq!(data.published(35), Some(false));
        assert!(!data.contains(99));
        assert_eq!(data.published(99), None);
    }
}
