#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use gitship_types::OperationKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Per-working-directory reentrancy guard.
///
/// At most one operation holds a given directory; a second acquisition fails
/// fast with `OperationInProgress` instead of waiting.
#[derive(Clone, Default)]
pub struct WorkspaceLocks {
    active: Arc<DashMap<PathBuf, OperationKind>>,
}

impl WorkspaceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by pipelines that were not given their own.
    pub fn shared() -> Self {
        static SHARED: OnceLock<WorkspaceLocks> = OnceLock::new();
        SHARED.get_or_init(WorkspaceLocks::new).clone()
    }

    pub fn try_acquire(
        &self,
        workspace: &Path,
        operation: OperationKind,
    ) -> Result<WorkspaceGuard, AppError> {
        let key = lock_key(workspace);
        match self.active.entry(key.clone()) {
            Entry::Occupied(held) => {
                tracing::warn!(
                    workspace = %workspace.display(),
                    requested = %operation,
                    running = %held.get(),
                    "operation refused; workspace busy"
                );
                Err(AppError::operation_in_progress(workspace))
            }
            Entry::Vacant(slot) => {
                slot.insert(operation);
                Ok(WorkspaceGuard {
                    active: Arc::clone(&self.active),
                    key,
                })
            }
        }
    }

    /// Operation currently holding `workspace`, if any.
    pub fn holder(&self, workspace: &Path) -> Option<OperationKind> {
        self.active.get(&lock_key(workspace)).map(|entry| *entry)
    }
}

/// Releases the workspace when dropped.
pub struct WorkspaceGuard {
    active: Arc<DashMap<PathBuf, OperationKind>>,
    key: PathBuf,
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        self.active.remove(&self.key);
    }
}

// Symlinked and relative spellings of one directory share a lock.
fn lock_key(workspace: &Path) -> PathBuf {
    std::fs::canonicalize(workspace).unwrap_or_else(|_| workspace.to_path_buf())
}
