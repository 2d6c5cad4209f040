//! Storage trait definition for the case log
//!
//! `CaseStore` is the only seam between the decision engine and
//! persistence. It is async and backend-agnostic; an in-memory fake is
//! provided for testing via the `fakes` module.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::records::{find_similar, CaseEntry, CaseKey, SimilarityTolerance};

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Append-only log of decision cases.
///
/// Guarantees:
/// - `load_all` returns every appended entry in insertion order, and is
///   restartable: each call returns the full current log.
/// - `append` never rewrites or drops earlier entries. Two racing appends
///   both land; neither corrupts the log.
/// - `query_similar` returns the same entry `find_similar` would pick from
///   `load_all`, i.e. the first match in insertion order.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Load the complete log, oldest first.
    async fn load_all(&self) -> StorageResult<Vec<CaseEntry>>;

    /// Append one entry to the end of the log.
    async fn append(&self, entry: &CaseEntry) -> StorageResult<()>;

    /// Find the first stored entry similar to `probe`.
    ///
    /// The default implementation scans `load_all` client-side. Backends
    /// that can match server-side should override it.
    async fn query_similar(
        &self,
        probe: &CaseKey,
        tolerance: &SimilarityTolerance,
    ) -> StorageResult<Option<CaseEntry>> {
        let entries = self.load_all().await?;
        Ok(find_similar(&entries, probe, tolerance).cloned())
    }

    /// Number of entries in the log.
    async fn len(&self) -> StorageResult<usize> {
        Ok(self.load_all().await?.len())
    }

    /// Whether the log has no entries yet.
    async fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len().await? == 0)
    }
}
