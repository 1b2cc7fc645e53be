//! # Applicant Management Backend
//!
//! Data access and HTTP surface for applicant records.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (ApplicantService, mapping, validation)
//!     ↓
//! Storage Layer (Repository + UnitOfWork over SQLite or memory)
//! ```
//!
//! Every layer above storage is generic over [`storage::Connection`], so the
//! same service and router run against either backend.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;
pub mod telemetry;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::CorsConfig;
use crate::domain::ApplicantService;
use crate::storage::Connection;

/// Main application state shared by every handler
#[derive(Clone)]
pub struct AppState<C: Connection> {
    pub applicant_service: ApplicantService<C>,
}

impl<C: Connection> AppState<C> {
    pub fn new(connection: C) -> Self {
        Self {
            applicant_service: ApplicantService::new(connection),
        }
    }
}

/// Create the Axum router with all routes configured
pub fn create_router<C: Connection>(app_state: AppState<C>, cors: &CorsConfig) -> Router {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/applicants",
            get(io::list_applicants::<C>).post(io::create_applicant::<C>),
        )
        .route(
            "/applicants/:id",
            get(io::get_applicant::<C>)
                .put(io::update_applicant::<C>)
                .delete(io::delete_applicant::<C>),
        );

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
