//! In-memory counter store using `DashMap`.
//!
//! Data is lost on process restart. Each record is a field map guarded by
//! its `DashMap` shard lock, which makes increments atomic.

use super::CounterStore;
use crate::{Error, Result};
use dashmap::DashMap;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

/// In-memory hash-field store.
///
/// Thread-safe and optimized for many concurrent counter updates.
///
/// # Example
///
/// ```rust
/// use trueno_ab::kv::{CounterStore, MemoryCounterStore};
///
/// # async fn example() -> trueno_ab::Result<()> {
/// let store = MemoryCounterStore::new();
/// assert!(store.hash_set_if_absent("exp:a", "participant_count", "0".into()).await?);
/// assert_eq!(store.hash_increment_by("exp:a", "participant_count", 2).await?, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryCounterStore {
    records: DashMap<String, FxHashMap<String, String>>,
}

impl MemoryCounterStore {
    /// Create a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Create with pre-allocated capacity (number of records).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: DashMap::with_capacity(capacity),
        }
    }

    /// Get the number of records in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clear all records.
    pub fn clear(&self) {
        self.records.clear();
    }
}

impl Default for MemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterStore for MemoryCounterStore {
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        Ok(self
            .records
            .get(key)
            .and_then(|record| record.get(field).cloned()))
    }

    async fn hash_set(&self, key: &str, field: &str, value: String) -> Result<()> {
        self.records
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value);
        Ok(())
    }

    async fn hash_set_if_absent(&self, key: &str, field: &str, value: String) -> Result<bool> {
        let mut record = self.records.entry(key.to_string()).or_default();
        let inserted = match record.entry(field.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        };
        Ok(inserted)
    }

    async fn hash_increment_by(&self, key: &str, field: &str, delta: i64) -> Result<i64> {
        // Shard write lock is held from parse to write-back
        let mut record = self.records.entry(key.to_string()).or_default();
        let current = match record.get(field) {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                Error::Store(format!("{key}/{field}: hash value is not an integer"))
            })?,
            None => 0,
        };
        let next = current
            .checked_add(delta)
            .ok_or_else(|| Error::Store(format!("{key}/{field}: increment would overflow")))?;
        record.insert(field.to_string(), next.to_string());
        Ok(next)
    }

    async fn hash_multi_set(&self, key: &str, fields: Vec<(String, String)>) -> Result<()> {
        let mut record = self.records.entry(key.to_string()).or_default();
        record.extend(fields);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.records.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.records.contains_key(key))
    }
}
