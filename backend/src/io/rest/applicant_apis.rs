//! # REST API for Applicant Management
//!
//! Endpoints for listing, searching, creating, retrieving, updating, and
//! deleting applicants. Every body is an `ApiResponse` envelope; a failure
//! envelope without diagnostics maps to 404.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use shared::{ApiResponse, ApplicantDto, ApplicantSearchRequest, CreateApplicantDto};
use tracing::{error, info, warn};

use crate::storage::traits::Connection;
use crate::AppState;

fn respond<T: Serialize>(
    response: ApiResponse<T>,
    success: StatusCode,
    failure: StatusCode,
) -> axum::response::Response {
    let status = if response.success {
        success
    } else if response.is_not_found() {
        warn!("{}", response.message);
        StatusCode::NOT_FOUND
    } else {
        error!("{}: {:?}", response.message, response.errors);
        failure
    };
    (status, Json(response)).into_response()
}

/// List applicants, optionally filtered by the query string
pub async fn list_applicants<C: Connection>(
    State(state): State<AppState<C>>,
    Query(search): Query<ApplicantSearchRequest>,
) -> impl IntoResponse {
    info!("GET /api/applicants - filters: {:?}", search);

    let response = state.applicant_service.search_applicants(search).await;
    respond(response, StatusCode::OK, StatusCode::INTERNAL_SERVER_ERROR)
}

/// Get an applicant by ID
pub async fn get_applicant<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/applicants/{}", id);

    let response = state.applicant_service.get_applicant(id).await;
    respond(response, StatusCode::OK, StatusCode::INTERNAL_SERVER_ERROR)
}

/// Create a new applicant
pub async fn create_applicant<C: Connection>(
    State(state): State<AppState<C>>,
    Json(request): Json<CreateApplicantDto>,
) -> impl IntoResponse {
    info!("POST /api/applicants - request: {:?}", request);

    let response = state.applicant_service.create_applicant(request).await;
    respond(response, StatusCode::CREATED, StatusCode::BAD_REQUEST)
}

/// Update an applicant
pub async fn update_applicant<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<i64>,
    Json(request): Json<ApplicantDto>,
) -> impl IntoResponse {
    info!("PUT /api/applicants/{} - request: {:?}", id, request);

    let response = state.applicant_service.update_applicant(id, request).await;
    respond(response, StatusCode::OK, StatusCode::BAD_REQUEST)
}

/// Delete an applicant
pub async fn delete_applicant<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/applicants/{}", id);

    let response = state.applicant_service.delete_applicant(id).await;
    respond(response, StatusCode::OK, StatusCode::INTERNAL_SERVER_ERROR)
}
