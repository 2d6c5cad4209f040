//! JSON-lines case log on the local filesystem.
//!
//! Layout: one `CaseEntry` JSON object per line, oldest first. The file is
//! only ever opened in append mode for writes, so earlier lines are never
//! rewritten.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{StateError, StorageError};
use crate::records::CaseEntry;
use crate::storage_traits::{CaseStore, StorageResult};

/// File-backed append-only case store.
#[derive(Debug)]
pub struct JsonlCaseStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlCaseStore {
    /// Open (or lazily create) the log at `path`. Creates parent directories.
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StateError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl CaseStore for JsonlCaseStore {
    async fn load_all(&self) -> StorageResult<Vec<CaseEntry>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<CaseEntry>(line) {
                Ok(entry) => entries.push(entry),
                // A torn final write must not hide the rest of the history.
                Err(err) => warn!(
                    path = %self.path.display(),
                    line = idx + 1,
                    error = %err,
                    "skipping malformed case entry"
                ),
            }
        }
        Ok(entries)
    }

    async fn append(&self, entry: &CaseEntry) -> StorageResult<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))?;

        debug!(case_id = %entry.id, path = %self.path.display(), "case appended");
        Ok(())
    }
}
