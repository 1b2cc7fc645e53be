use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::models::Applicant;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::memory::unit_of_work::MemoryUnitOfWork;
use crate::storage::traits::Connection;

/// The committed table, shared by every unit of work of one connection
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    pub(crate) rows: BTreeMap<i64, Applicant>,
    last_id: i64,
    flush_fault: Option<String>,
    read_fault: Option<String>,
}

pub(crate) type SharedStore = Arc<Mutex<MemoryStore>>;

impl MemoryStore {
    /// Identities are never reused, matching `AUTOINCREMENT`
    pub(crate) fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    pub(crate) fn check_reads(&self) -> StorageResult<()> {
        match &self.read_fault {
            Some(reason) => Err(StorageError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    pub(crate) fn take_flush_fault(&mut self) -> Option<String> {
        self.flush_fault.take()
    }
}

/// In-process storage backend with the same contract as the SQLite one.
///
/// Used by tests and by `APP_STORAGE=memory`. Supports fault injection so
/// failure paths can be driven deterministically.
#[derive(Clone, Default)]
pub struct MemoryConnection {
    store: SharedStore,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next flush that has staged changes fail without applying any.
    pub async fn fail_next_flush(&self, reason: impl Into<String>) {
        let reason = reason.into();
        debug!(%reason, "Injecting flush failure");
        self.store.lock().await.flush_fault = Some(reason);
    }

    /// Make every read fail until cleared with `None`.
    pub async fn fail_reads(&self, reason: Option<String>) {
        self.store.lock().await.read_fault = reason;
    }

    /// Committed rows, bypassing any unit of work
    pub async fn committed(&self) -> Vec<Applicant> {
        self.store.lock().await.rows.values().cloned().collect()
    }
}

impl Connection for MemoryConnection {
    type UnitOfWork = MemoryUnitOfWork;

    fn unit_of_work(&self) -> MemoryUnitOfWork {
        MemoryUnitOfWork::new(self.store.clone())
    }
}
