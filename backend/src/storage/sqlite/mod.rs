//! SQLite backend built on sqlx.

pub mod applicant_repository;
pub mod connection;
pub mod unit_of_work;

pub use applicant_repository::SqliteApplicantRepository;
pub use connection::DbConnection;
pub use unit_of_work::SqliteUnitOfWork;
