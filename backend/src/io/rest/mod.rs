//! # REST API Interface Layer
//!
//! HTTP endpoints for applicant records. This layer only translates between
//! HTTP and the domain service:
//! - JSON request/response (de)serialization
//! - `ApiResponse` outcomes to HTTP status codes
//! - Request logging
//!
//! Validation and persistence stay in the domain and storage layers.

pub mod applicant_apis;

pub use applicant_apis::*;
