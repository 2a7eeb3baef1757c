//! Counter Store Module
//!
//! Hash-field key-value contract consumed by the variant layer:
//! - One record per `"<experiment>:<variant>"` key, holding string fields
//! - Atomic integer increments (no lost updates under concurrent callers)
//! - Set-if-absent for idempotent initialization
//!
//! The store is an external collaborator. `MemoryCounterStore` is the
//! in-process backend used for embedding and tests; a networked backend
//! implements the same trait.
//!
//! # Example
//!
//! ```rust,no_run
//! use trueno_ab::kv::{CounterStore, MemoryCounterStore};
//!
//! # async fn example() -> trueno_ab::Result<()> {
//! let store = MemoryCounterStore::new();
//!
//! store.hash_increment_by("checkout:blue", "participant_count", 1).await?;
//! let count = store.hash_get("checkout:blue", "participant_count").await?;
//! assert_eq!(count.as_deref(), Some("1"));
//!
//! store.delete("checkout:blue").await?;
//! assert!(!store.exists("checkout:blue").await?);
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::MemoryCounterStore;

use crate::Result;
use std::future::Future;

/// Hash-field counter store.
///
/// Every method is an independent round-trip; there are no cross-field
/// transactions. Failures are reported as [`crate::Error::Store`] and are
/// propagated unchanged by callers.
pub trait CounterStore: Send + Sync {
    /// Get a field of a record.
    ///
    /// Returns `None` if the record or the field doesn't exist.
    fn hash_get(
        &self,
        key: &str,
        field: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Set a field, overwriting any existing value.
    fn hash_set(
        &self,
        key: &str,
        field: &str,
        value: String,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Set a field only if it is absent.
    ///
    /// Returns `true` if the value was written.
    fn hash_set_if_absent(
        &self,
        key: &str,
        field: &str,
        value: String,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Atomically add `delta` to an integer field and return the new value.
    ///
    /// A missing field counts as 0. A field holding a non-integer is an error.
    fn hash_increment_by(
        &self,
        key: &str,
        field: &str,
        delta: i64,
    ) -> impl Future<Output = Result<i64>> + Send;

    /// Set several fields of one record.
    fn hash_multi_set(
        &self,
        key: &str,
        fields: Vec<(String, String)>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a record with all its fields.
    ///
    /// No-op if the key doesn't exist.
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// Check if a record exists.
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;
}
