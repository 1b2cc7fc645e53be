//! In-process backend with the same unit-of-work contract as SQLite.

pub mod applicant_repository;
pub mod connection;
pub mod unit_of_work;

pub use applicant_repository::MemoryApplicantRepository;
pub use connection::MemoryConnection;
pub use unit_of_work::MemoryUnitOfWork;
