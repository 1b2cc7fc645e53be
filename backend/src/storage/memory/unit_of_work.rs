use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::models::Applicant;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::memory::applicant_repository::MemoryApplicantRepository;
use crate::storage::memory::connection::{MemoryStore, SharedStore};
use crate::storage::traits::{TransactionState, UnitOfWork};

/// A staged mutation
#[derive(Debug, Clone)]
pub(crate) enum Change {
    Insert(Applicant),
    Update(Applicant),
    Delete(i64),
}

/// Best-effort replay used to build read views.
fn overlay(rows: &mut BTreeMap<i64, Applicant>, changes: &[Change]) {
    for change in changes {
        match change {
            Change::Insert(applicant) => {
                rows.insert(applicant.id, applicant.clone());
            }
            Change::Update(applicant) => {
                if let Some(slot) = rows.get_mut(&applicant.id) {
                    *slot = applicant.clone();
                }
            }
            Change::Delete(id) => {
                rows.remove(id);
            }
        }
    }
}

/// Strict replay: either every change applies or the table is left untouched.
fn apply(
    rows: &BTreeMap<i64, Applicant>,
    changes: &[Change],
) -> StorageResult<(BTreeMap<i64, Applicant>, u64)> {
    let mut next = rows.clone();
    let mut affected = 0;

    for change in changes {
        match change {
            Change::Insert(applicant) => {
                applicant.validate()?;
                if next.contains_key(&applicant.id) {
                    return Err(StorageError::Constraint(format!(
                        "UNIQUE constraint failed: applicants.id ({})",
                        applicant.id
                    )));
                }
                next.insert(applicant.id, applicant.clone());
                affected += 1;
            }
            Change::Update(applicant) => {
                applicant.validate()?;
                match next.get_mut(&applicant.id) {
                    Some(slot) => *slot = applicant.clone(),
                    None => return Err(StorageError::MissingRow(applicant.id)),
                }
                affected += 1;
            }
            Change::Delete(id) => {
                if next.remove(id).is_some() {
                    affected += 1;
                }
            }
        }
    }

    Ok((next, affected))
}

/// Pending state of one memory unit of work
#[derive(Debug, Default)]
pub(crate) struct MemoryContext {
    staged: Vec<Change>,
    /// Changes flushed inside the open transaction, replayed on commit
    transaction: Option<Vec<Change>>,
    failure: Option<String>,
    disposed: bool,
}

pub(crate) type SharedMemoryContext = Arc<Mutex<MemoryContext>>;

impl MemoryContext {
    pub(crate) fn ensure_open(&self) -> StorageResult<()> {
        if self.disposed {
            return Err(StorageError::Disposed);
        }
        Ok(())
    }

    /// Committed rows as this unit of work sees them
    pub(crate) fn view(&self, store: &MemoryStore) -> BTreeMap<i64, Applicant> {
        let mut rows = store.rows.clone();
        if let Some(log) = &self.transaction {
            overlay(&mut rows, log);
        }
        overlay(&mut rows, &self.staged);
        rows
    }

    pub(crate) fn stage(&mut self, change: Change) {
        self.staged.push(change);
    }

    pub(crate) fn record_failure(&mut self, err: &StorageError) {
        if self.failure.is_none() {
            self.failure = Some(err.to_string());
        }
    }

    fn flush(&mut self, store: &mut MemoryStore) -> StorageResult<u64> {
        self.ensure_open()?;
        let staged = std::mem::take(&mut self.staged);

        if let Some(reason) = self.failure.take() {
            warn!(%reason, "Discarding staged changes after failed write");
            return Err(StorageError::FlushAborted(reason));
        }
        if staged.is_empty() {
            return Ok(0);
        }
        if let Some(reason) = store.take_flush_fault() {
            return Err(StorageError::Unavailable(reason));
        }

        match self.transaction.as_mut() {
            Some(log) => {
                let mut base = store.rows.clone();
                overlay(&mut base, log);
                let (_, affected) = apply(&base, &staged)?;
                log.extend(staged);
                debug!(affected, "Flushed changes into open transaction");
                Ok(affected)
            }
            None => {
                let (rows, affected) = apply(&store.rows, &staged)?;
                store.rows = rows;
                debug!(affected, "Flushed and committed changes");
                Ok(affected)
            }
        }
    }

    fn reset(&mut self) {
        self.staged.clear();
        self.transaction = None;
        self.failure = None;
    }
}

/// Unit of work over a `MemoryConnection`
pub struct MemoryUnitOfWork {
    store: SharedStore,
    context: SharedMemoryContext,
    applicants: MemoryApplicantRepository,
}

impl MemoryUnitOfWork {
    pub(crate) fn new(store: SharedStore) -> Self {
        let context = Arc::new(Mutex::new(MemoryContext::default()));
        Self {
            applicants: MemoryApplicantRepository::new(store.clone(), context.clone()),
            store,
            context,
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    type Applicants = MemoryApplicantRepository;

    fn applicants(&self) -> &MemoryApplicantRepository {
        &self.applicants
    }

    async fn state(&self) -> TransactionState {
        if self.context.lock().await.transaction.is_some() {
            TransactionState::InTransaction
        } else {
            TransactionState::Idle
        }
    }

    async fn begin_transaction(&self) -> StorageResult<()> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;
        if ctx.transaction.is_some() {
            return Err(StorageError::TransactionAlreadyOpen);
        }
        ctx.transaction = Some(Vec::new());
        debug!("Transaction started");
        Ok(())
    }

    async fn save_changes(&self) -> StorageResult<u64> {
        let mut ctx = self.context.lock().await;
        let mut store = self.store.lock().await;
        ctx.flush(&mut store)
    }

    async fn commit(&self) -> StorageResult<()> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;
        let mut store = self.store.lock().await;

        if let Err(err) = ctx.flush(&mut store) {
            ctx.reset();
            return Err(err);
        }

        let log = ctx.transaction.take();
        ctx.reset();
        if let Some(log) = log {
            let (rows, affected) = apply(&store.rows, &log)?;
            store.rows = rows;
            debug!(affected, "Transaction committed");
        }
        Ok(())
    }

    async fn rollback(&self) -> StorageResult<()> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;
        ctx.reset();
        Ok(())
    }

    async fn dispose(&self) {
        let mut ctx = self.context.lock().await;
        ctx.reset();
        ctx.disposed = true;
    }
}
