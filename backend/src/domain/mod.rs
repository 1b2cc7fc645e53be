//! # Domain Module
//!
//! Business logic for applicant records, independent of the HTTP layer and of
//! the storage backend in use.
//!
//! ## Module Organization
//!
//! - **models**: the `Applicant` entity, its validation rules and its fields
//! - **applicant_mapper**: conversions between the wire types and the entity
//! - **applicant_service**: CRUD and search, each wrapped in an `ApiResponse`
//!
//! ## Business Rules
//!
//! - Family name is mandatory; the other text fields are optional
//! - New applicants are not hired unless the request says so
//! - A missing applicant is reported as "not found", never as a storage error

pub mod applicant_mapper;
pub mod applicant_service;
pub mod models;

pub use applicant_mapper::ApplicantMapper;
pub use applicant_service::ApplicantService;
