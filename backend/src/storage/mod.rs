//! # Storage Module
//!
//! Persistence for applicant records behind a generic repository and a unit
//! of work. The domain layer only sees the traits in [`traits`]; the backend
//! is picked at startup.
//!
//! ## Backends
//!
//! - `sqlite`: sqlx connection pool over a database file (or `sqlite::memory:`)
//! - `memory`: in-process table with fault injection, used by tests
//!
//! ## Flush Semantics
//!
//! Repository writes are staged in the unit of work. `save_changes` applies
//! everything staged since the last flush, all or nothing. A failed staged
//! write aborts the next flush instead of letting a partial set through.

pub mod error;
pub mod memory;
pub mod predicate;
pub mod sqlite;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryConnection;
pub use predicate::{CompareOp, Field, Predicate, Record, Value};
pub use sqlite::DbConnection;
pub use traits::{Connection, Repository, TransactionState, UnitOfWork};
