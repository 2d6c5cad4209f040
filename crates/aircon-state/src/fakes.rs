//! In-memory and fault-injecting case stores
//!
//! Provides `MemoryCaseStore`, which satisfies the `CaseStore` contract
//! without external dependencies (the CLI's `--backend memory` uses it for
//! throwaway sessions), and `UnavailableCaseStore`, which fails
//! every call so callers can exercise their degraded paths.
//! `DelayedCaseStore` wraps another store and stalls before each call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::records::CaseEntry;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryCaseStore
// ---------------------------------------------------------------------------

/// In-memory case log backed by a `Vec<CaseEntry>`.
#[derive(Debug, Default)]
pub struct MemoryCaseStore {
    entries: Mutex<Vec<CaseEntry>>,
}

impl MemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing log (oldest first).
    pub fn with_entries(entries: Vec<CaseEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Vec<CaseEntry>>> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CaseStore for MemoryCaseStore {
    async fn load_all(&self) -> StorageResult<Vec<CaseEntry>> {
        Ok(self.lock()?.clone())
    }

    async fn append(&self, entry: &CaseEntry) -> StorageResult<()> {
        self.lock()?.push(entry.clone());
        Ok(())
    }

    async fn len(&self) -> StorageResult<usize> {
        Ok(self.lock()?.len())
    }
}

// ---------------------------------------------------------------------------
// UnavailableCaseStore
// ---------------------------------------------------------------------------

/// A store whose every call fails with `StorageError::Unavailable`.
///
/// Counts attempted appends so tests can assert persistence was tried.
#[derive(Debug, Default)]
pub struct UnavailableCaseStore {
    append_attempts: AtomicUsize,
}

impl UnavailableCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_attempts(&self) -> usize {
        self.append_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaseStore for UnavailableCaseStore {
    async fn load_all(&self) -> StorageResult<Vec<CaseEntry>> {
        Err(StorageError::Unavailable("case store is offline".to_string()))
    }

    async fn append(&self, _entry: &CaseEntry) -> StorageResult<()> {
        self.append_attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Unavailable("case store is offline".to_string()))
    }
}

// ---------------------------------------------------------------------------
// DelayedCaseStore
// ---------------------------------------------------------------------------

/// Wraps a store and sleeps for `delay` before delegating each call.
#[derive(Debug)]
pub struct DelayedCaseStore<S> {
    inner: S,
    delay: Duration,
}

impl<S: CaseStore> DelayedCaseStore<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: CaseStore> CaseStore for DelayedCaseStore<S> {
    async fn load_all(&self) -> StorageResult<Vec<CaseEntry>> {
        tokio::time::sleep(self.delay).await;
        self.inner.load_all().await
    }

    async fn append(&self, entry: &CaseEntry) -> StorageResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.append(entry).await
    }
}
