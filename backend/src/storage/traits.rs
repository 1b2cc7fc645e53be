//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use async_trait::async_trait;

use crate::domain::models::{Applicant, ApplicantPredicate};
use crate::storage::error::StorageResult;

/// Generic CRUD contract over one entity type `E`, filtered by predicates `P`.
///
/// Mutations are staged in the owning unit of work and only become durable
/// when it flushes. Operations touching several rows are not atomic with each
/// other; atomicity across calls is the unit of work's job.
#[async_trait]
pub trait Repository<E, P>: Send + Sync {
    /// All rows ordered by identity. An empty table yields an empty vector.
    async fn get_all(&self) -> StorageResult<Vec<E>>;

    /// `None` when no row has this identity
    async fn get_by_id(&self, id: i64) -> StorageResult<Option<E>>;

    /// Existence check that does not materialize the row
    async fn exists(&self, id: i64) -> StorageResult<bool>;

    /// Stage an insert and return the entity with its store-assigned identity
    async fn add(&self, entity: &E) -> StorageResult<E>;

    /// Stage an update of an existing row
    async fn update(&self, entity: &E) -> StorageResult<E>;

    /// Stage a delete. Returns false (not an error) if the row was not there.
    async fn delete(&self, id: i64) -> StorageResult<bool>;

    /// Rows matching the predicate, evaluated by the store
    async fn find(&self, predicate: P) -> StorageResult<Vec<E>>;
}

/// Where a unit of work is in its transaction lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    InTransaction,
}

/// Owns one persistence context, the repositories sharing it, and the
/// transaction lifecycle: `Idle -> begin -> InTransaction -> commit|rollback -> Idle`.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Applicants: Repository<Applicant, ApplicantPredicate>;

    fn applicants(&self) -> &Self::Applicants;

    async fn state(&self) -> TransactionState;

    /// Fails with `TransactionAlreadyOpen` if a transaction is in progress.
    async fn begin_transaction(&self) -> StorageResult<()>;

    /// Flush every change staged since the last flush, all or nothing.
    /// Outside a transaction this makes them durable; inside one they stay
    /// private to the transaction until `commit`.
    async fn save_changes(&self) -> StorageResult<u64>;

    /// Flush, then commit. A failed flush rolls the transaction back and the
    /// error is returned; the unit of work is `Idle` afterwards either way.
    async fn commit(&self) -> StorageResult<()>;

    /// Discard the transaction and every unflushed change. No-op when idle.
    async fn rollback(&self) -> StorageResult<()>;

    /// Release the persistence context. Safe to call more than once.
    async fn dispose(&self);
}

/// Trait defining the interface for storage connections
///
/// A connection is cheap to clone and shareable between requests; each
/// logical operation asks it for a fresh unit of work.
pub trait Connection: Send + Sync + Clone + 'static {
    /// The type of UnitOfWork this connection creates
    type UnitOfWork: UnitOfWork;

    /// Create a new unit of work with its own persistence context
    fn unit_of_work(&self) -> Self::UnitOfWork;
}
