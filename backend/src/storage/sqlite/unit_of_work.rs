use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::{Sqlite, Transaction};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::sqlite::applicant_repository::SqliteApplicantRepository;
use crate::storage::traits::{TransactionState, UnitOfWork};

const FLUSH_SAVEPOINT: &str = "uow_flush";

/// Persistence context shared by a unit of work and its repositories.
///
/// Writes run inside `transaction`, which is opened lazily by the first write
/// (implicit) or by `begin_transaction` (explicit). Inside an explicit
/// transaction each flush is bracketed by a savepoint so a failed flush only
/// discards its own changes.
pub(crate) struct PersistenceContext {
    transaction: Option<Transaction<'static, Sqlite>>,
    explicit: bool,
    savepoint_open: bool,
    /// Rows touched since the last flush
    affected: u64,
    /// First failed write since the last flush
    failure: Option<String>,
    disposed: bool,
}

pub(crate) type SharedContext = Arc<Mutex<PersistenceContext>>;

impl PersistenceContext {
    fn new() -> Self {
        Self {
            transaction: None,
            explicit: false,
            savepoint_open: false,
            affected: 0,
            failure: None,
            disposed: false,
        }
    }

    pub(crate) fn ensure_open(&self) -> StorageResult<()> {
        if self.disposed {
            return Err(StorageError::Disposed);
        }
        Ok(())
    }

    /// Connection of the open transaction, if any. Reads go here so they
    /// observe this unit of work's own uncommitted writes.
    pub(crate) fn reader(&mut self) -> Option<&mut SqliteConnection> {
        self.transaction.as_mut().map(|tx| &mut **tx)
    }

    /// Connection writes must use; opens the transaction (and the flush
    /// savepoint inside an explicit one) on first use.
    pub(crate) async fn writer(&mut self, pool: &SqlitePool) -> StorageResult<&mut SqliteConnection> {
        let mut tx = match self.transaction.take() {
            Some(tx) => tx,
            None => {
                debug!("Opening implicit transaction");
                pool.begin().await?
            }
        };

        if self.explicit && !self.savepoint_open {
            let opened = sqlx::query(&format!("SAVEPOINT {FLUSH_SAVEPOINT}"))
                .execute(&mut *tx)
                .await;
            if let Err(err) = opened {
                self.transaction = Some(tx);
                return Err(err.into());
            }
            self.savepoint_open = true;
        }

        let tx = self.transaction.insert(tx);
        Ok(&mut **tx)
    }

    pub(crate) fn record_write(&mut self, rows: u64) {
        self.affected += rows;
    }

    pub(crate) fn record_failure(&mut self, err: &StorageError) {
        if self.failure.is_none() {
            self.failure = Some(err.to_string());
        }
    }

    /// Flush staged writes as one unit.
    async fn flush(&mut self) -> StorageResult<u64> {
        self.ensure_open()?;
        let affected = std::mem::take(&mut self.affected);

        if let Some(reason) = self.failure.take() {
            warn!(%reason, "Discarding staged changes after failed write");
            self.discard_flush().await?;
            return Err(StorageError::FlushAborted(reason));
        }

        if self.explicit {
            if self.savepoint_open {
                if let Some(tx) = self.transaction.as_mut() {
                    sqlx::query(&format!("RELEASE SAVEPOINT {FLUSH_SAVEPOINT}"))
                        .execute(&mut **tx)
                        .await?;
                }
                self.savepoint_open = false;
            }
            debug!(affected, "Flushed changes into open transaction");
            return Ok(affected);
        }

        if let Some(tx) = self.transaction.take() {
            tx.commit().await?;
        }
        debug!(affected, "Flushed and committed changes");
        Ok(affected)
    }

    /// Undo whatever the current flush staged.
    async fn discard_flush(&mut self) -> StorageResult<()> {
        if self.explicit {
            if self.savepoint_open {
                self.savepoint_open = false;
                if let Some(tx) = self.transaction.as_mut() {
                    sqlx::query(&format!("ROLLBACK TO SAVEPOINT {FLUSH_SAVEPOINT}"))
                        .execute(&mut **tx)
                        .await?;
                    sqlx::query(&format!("RELEASE SAVEPOINT {FLUSH_SAVEPOINT}"))
                        .execute(&mut **tx)
                        .await?;
                }
            }
            return Ok(());
        }

        if let Some(tx) = self.transaction.take() {
            tx.rollback().await?;
        }
        Ok(())
    }

    /// Drop the transaction and every pending change, returning to `Idle`.
    async fn rollback_all(&mut self) -> StorageResult<()> {
        let tx = self.transaction.take();
        self.reset();
        if let Some(tx) = tx {
            debug!("Rolling back transaction");
            tx.rollback().await?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.explicit = false;
        self.savepoint_open = false;
        self.affected = 0;
        self.failure = None;
    }
}

/// Unit of work over the SQLite pool
pub struct SqliteUnitOfWork {
    context: SharedContext,
    applicants: SqliteApplicantRepository,
}

impl SqliteUnitOfWork {
    pub fn new(pool: SqlitePool) -> Self {
        let context = Arc::new(Mutex::new(PersistenceContext::new()));
        Self {
            applicants: SqliteApplicantRepository::new(pool, context.clone()),
            context,
        }
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    type Applicants = SqliteApplicantRepository;

    fn applicants(&self) -> &SqliteApplicantRepository {
        &self.applicants
    }

    async fn state(&self) -> TransactionState {
        if self.context.lock().await.explicit {
            TransactionState::InTransaction
        } else {
            TransactionState::Idle
        }
    }

    async fn begin_transaction(&self) -> StorageResult<()> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;
        if ctx.explicit {
            return Err(StorageError::TransactionAlreadyOpen);
        }

        match ctx.transaction.as_mut() {
            // Writes staged before the transaction started join its first flush
            Some(tx) => {
                sqlx::query(&format!("SAVEPOINT {FLUSH_SAVEPOINT}"))
                    .execute(&mut **tx)
                    .await?;
                ctx.savepoint_open = true;
            }
            None => {
                ctx.transaction = Some(self.applicants.pool().begin().await?);
            }
        }
        ctx.explicit = true;
        debug!("Transaction started");
        Ok(())
    }

    async fn save_changes(&self) -> StorageResult<u64> {
        let mut ctx = self.context.lock().await;
        ctx.flush().await
    }

    async fn commit(&self) -> StorageResult<()> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;

        if let Err(err) = ctx.flush().await {
            if let Err(rollback_err) = ctx.rollback_all().await {
                warn!(error = %rollback_err, "Rollback after failed commit also failed");
            }
            return Err(err);
        }

        let tx = ctx.transaction.take();
        ctx.reset();
        if let Some(tx) = tx {
            tx.commit().await?;
            debug!("Transaction committed");
        }
        Ok(())
    }

    async fn rollback(&self) -> StorageResult<()> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;
        ctx.rollback_all().await
    }

    async fn dispose(&self) {
        let mut ctx = self.context.lock().await;
        if ctx.disposed {
            return;
        }
        if let Err(err) = ctx.rollback_all().await {
            warn!(error = %err, "Failed to roll back while disposing unit of work");
        }
        ctx.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Applicant;
    use crate::storage::sqlite::connection::DbConnection;
    use crate::storage::traits::{Connection, Repository};

    async fn setup_test() -> DbConnection {
        DbConnection::init_test().await.expect("Failed to create test database")
    }

    fn applicant(family_name: &str, age: i32) -> Applicant {
        Applicant {
            id: 0,
            name: Some("Test".to_string()),
            family_name: family_name.to_string(),
            address: None,
            country_of_origin: Some("Egypt".to_string()),
            email_address: None,
            age,
            hired: false,
        }
    }

    async fn committed_count(db: &DbConnection) -> usize {
        let uow = db.unit_of_work();
        let count = uow.applicants().get_all().await.expect("Failed to list").len();
        uow.dispose().await;
        count
    }

    #[tokio::test]
    async fn test_save_changes_makes_writes_durable() {
        let db = setup_test().await;
        let uow = db.unit_of_work();

        uow.applicants().add(&applicant("Alaa", 25)).await.expect("add");
        uow.applicants().add(&applicant("Alallah", 30)).await.expect("add");
        let affected = uow.save_changes().await.expect("save");
        uow.dispose().await;

        assert_eq!(affected, 2);
        assert_eq!(committed_count(&db).await, 2);
    }

    #[tokio::test]
    async fn test_save_changes_without_pending_writes_is_zero() {
        let db = setup_test().await;
        let uow = db.unit_of_work();

        assert_eq!(uow.save_changes().await.expect("save"), 0);
    }

    #[tokio::test]
    async fn test_reads_see_own_staged_writes() {
        let db = setup_test().await;
        let uow = db.unit_of_work();

        let added = uow.applicants().add(&applicant("Alaa", 25)).await.expect("add");
        let fetched = uow.applicants().get_by_id(added.id).await.expect("get");

        assert_eq!(fetched, Some(added));
        uow.rollback().await.expect("rollback");
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_discards_unsaved_writes() {
        let db = setup_test().await;

        {
            let uow = db.unit_of_work();
            uow.applicants().add(&applicant("Alaa", 25)).await.expect("add");
            uow.dispose().await;
        }

        assert_eq!(committed_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_state_machine() {
        let db = setup_test().await;
        let uow = db.unit_of_work();

        assert_eq!(uow.state().await, TransactionState::Idle);
        uow.begin_transaction().await.expect("begin");
        assert_eq!(uow.state().await, TransactionState::InTransaction);

        let err = uow.begin_transaction().await.unwrap_err();
        assert!(err.is_transaction_state());
        // A rejected begin must not disturb the open transaction
        assert_eq!(uow.state().await, TransactionState::InTransaction);

        uow.commit().await.expect("commit");
        assert_eq!(uow.state().await, TransactionState::Idle);

        uow.begin_transaction().await.expect("begin again");
        uow.rollback().await.expect("rollback");
        assert_eq!(uow.state().await, TransactionState::Idle);
    }

    #[tokio::test]
    async fn test_rollback_when_idle_is_noop() {
        let db = setup_test().await;
        let uow = db.unit_of_work();

        uow.rollback().await.expect("rollback when idle");
        assert_eq!(uow.state().await, TransactionState::Idle);
    }

    #[tokio::test]
    async fn test_commit_persists_every_flush() {
        let db = setup_test().await;
        let uow = db.unit_of_work();

        uow.begin_transaction().await.expect("begin");
        uow.applicants().add(&applicant("First", 20)).await.expect("add");
        assert_eq!(uow.save_changes().await.expect("flush"), 1);
        uow.applicants().add(&applicant("Second", 21)).await.expect("add");
        uow.commit().await.expect("commit");
        uow.dispose().await;

        assert_eq!(committed_count(&db).await, 2);
    }

    #[tokio::test]
    async fn test_rollback_discards_flushed_changes() {
        let db = setup_test().await;
        let uow = db.unit_of_work();

        uow.begin_transaction().await.expect("begin");
        uow.applicants().add(&applicant("First", 20)).await.expect("add");
        uow.save_changes().await.expect("flush");
        uow.rollback().await.expect("rollback");
        uow.dispose().await;

        assert_eq!(committed_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_nothing_behind() {
        let db = setup_test().await;
        let uow = db.unit_of_work();

        uow.begin_transaction().await.expect("begin");
        uow.applicants().add(&applicant("Valid", 20)).await.expect("add");
        uow.applicants().add(&applicant("Also valid", 22)).await.expect("add");
        let invalid = uow.applicants().add(&applicant("", 40)).await;
        assert!(matches!(invalid, Err(StorageError::Validation(_))));

        let result = uow.commit().await;
        assert!(matches!(result, Err(StorageError::FlushAborted(_))));
        assert_eq!(uow.state().await, TransactionState::Idle);
        uow.dispose().await;

        assert_eq!(committed_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_failed_implicit_flush_is_all_or_nothing() {
        let db = setup_test().await;
        let uow = db.unit_of_work();

        uow.applicants().add(&applicant("Staged", 20)).await.expect("add");
        let missing = applicant("Ghost", 50);
        let update = uow.applicants().update(&Applicant { id: 999, ..missing }).await;
        assert!(matches!(update, Err(StorageError::MissingRow(999))));

        let result = uow.save_changes().await;
        assert!(matches!(result, Err(StorageError::FlushAborted(_))));
        uow.dispose().await;

        assert_eq!(committed_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_failed_flush_inside_transaction_keeps_earlier_flushes() {
        let db = setup_test().await;
        let uow = db.unit_of_work();

        uow.begin_transaction().await.expect("begin");
        uow.applicants().add(&applicant("Kept", 20)).await.expect("add");
        uow.save_changes().await.expect("first flush");

        uow.applicants().add(&applicant("Dropped", 21)).await.expect("add");
        let _ = uow.applicants().add(&applicant(" ", 22)).await;
        assert!(uow.save_changes().await.is_err());
        assert_eq!(uow.state().await, TransactionState::InTransaction);

        uow.commit().await.expect("commit");
        uow.dispose().await;

        let check = db.unit_of_work();
        let names: Vec<String> = check
            .applicants()
            .get_all()
            .await
            .expect("list")
            .into_iter()
            .map(|a| a.family_name)
            .collect();
        assert_eq!(names, vec!["Kept".to_string()]);
    }

    #[tokio::test]
    async fn test_writes_before_begin_join_the_transaction() {
        let db = setup_test().await;
        let uow = db.unit_of_work();

        uow.applicants().add(&applicant("Early", 20)).await.expect("add");
        uow.begin_transaction().await.expect("begin");
        uow.applicants().add(&applicant("Late", 21)).await.expect("add");
        assert_eq!(uow.save_changes().await.expect("flush"), 2);
        uow.rollback().await.expect("rollback");
        uow.dispose().await;

        assert_eq!(committed_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_dispose_is_idempotent_and_final() {
        let db = setup_test().await;
        let uow = db.unit_of_work();

        uow.begin_transaction().await.expect("begin");
        uow.applicants().add(&applicant("Pending", 20)).await.expect("add");
        uow.dispose().await;
        uow.dispose().await;

        assert!(matches!(
            uow.applicants().get_all().await,
            Err(StorageError::Disposed)
        ));
        assert!(matches!(uow.save_changes().await, Err(StorageError::Disposed)));
        assert!(matches!(uow.begin_transaction().await, Err(StorageError::Disposed)));
        assert_eq!(committed_count(&db).await, 0);
    }
}
