use shared::{ApiResponse, ApplicantDto, ApplicantSearchRequest, CreateApplicantDto};
use tracing::{error, info, warn};

use crate::domain::applicant_mapper::ApplicantMapper;
use crate::domain::models::{Applicant, ApplicantPredicate};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::{Connection, Repository, UnitOfWork};

/// Service for managing applicant records.
///
/// Every operation runs in its own unit of work, disposes it on the way out,
/// and reports the outcome as an `ApiResponse` instead of an error.
#[derive(Clone)]
pub struct ApplicantService<C: Connection> {
    connection: C,
}

impl<C: Connection> ApplicantService<C> {
    /// Create a new ApplicantService
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// List all applicants, ordered by ID
    pub async fn list_applicants(&self) -> ApiResponse<Vec<ApplicantDto>> {
        info!("Listing all applicants");

        let uow = self.connection.unit_of_work();
        let result = uow.applicants().get_all().await;
        uow.dispose().await;

        Self::applicant_list_response(result)
    }

    /// List the applicants matching every filter set in the request
    pub async fn search_applicants(
        &self,
        request: ApplicantSearchRequest,
    ) -> ApiResponse<Vec<ApplicantDto>> {
        if request.is_empty() {
            return self.list_applicants().await;
        }
        info!("Searching applicants: {:?}", request);

        let predicate: ApplicantPredicate = ApplicantMapper::search_predicate(&request);
        let uow = self.connection.unit_of_work();
        let result = uow.applicants().find(predicate).await;
        uow.dispose().await;

        Self::applicant_list_response(result)
    }

    /// Get an applicant by ID
    pub async fn get_applicant(&self, id: i64) -> ApiResponse<ApplicantDto> {
        info!("Getting applicant: {}", id);

        let uow = self.connection.unit_of_work();
        let result = uow.applicants().get_by_id(id).await;
        uow.dispose().await;

        match result {
            Ok(Some(applicant)) => ApiResponse::success_response(
                ApplicantMapper::to_dto(applicant),
                "Applicant retrieved successfully",
            ),
            Ok(None) => Self::not_found(id),
            Err(err) => Self::failure("Error retrieving applicant", err),
        }
    }

    /// Create a new applicant
    pub async fn create_applicant(&self, request: CreateApplicantDto) -> ApiResponse<ApplicantDto> {
        info!(
            "Creating applicant: family_name={}, age={}",
            request.family_name, request.age
        );

        let applicant = ApplicantMapper::from_create_request(request);
        let uow = self.connection.unit_of_work();
        let result = Self::create_in(&uow, applicant).await;
        uow.dispose().await;

        match result {
            Ok(created) => {
                info!("Created applicant with ID: {}", created.id);
                ApiResponse::success_response(
                    ApplicantMapper::to_dto(created),
                    "Applicant created successfully",
                )
            }
            Err(err) => Self::failure("Error creating applicant", err),
        }
    }

    /// Replace every mutable field of an existing applicant
    pub async fn update_applicant(&self, id: i64, dto: ApplicantDto) -> ApiResponse<ApplicantDto> {
        info!("Updating applicant: {}", id);

        let uow = self.connection.unit_of_work();
        let result = Self::update_in(&uow, id, dto).await;
        uow.dispose().await;

        match result {
            Ok(Some(updated)) => {
                info!("Updated applicant with ID: {}", updated.id);
                ApiResponse::success_response(
                    ApplicantMapper::to_dto(updated),
                    "Applicant updated successfully",
                )
            }
            Ok(None) => Self::not_found(id),
            Err(err) => Self::failure("Error updating applicant", err),
        }
    }

    /// Delete an applicant
    pub async fn delete_applicant(&self, id: i64) -> ApiResponse<bool> {
        info!("Deleting applicant: {}", id);

        let uow = self.connection.unit_of_work();
        let result = Self::delete_in(&uow, id).await;
        uow.dispose().await;

        match result {
            Ok(Some(deleted)) => {
                info!("Deleted applicant with ID: {}", id);
                ApiResponse::success_response(deleted, "Applicant deleted successfully")
            }
            Ok(None) => Self::not_found(id),
            Err(err) => Self::failure("Error deleting applicant", err),
        }
    }

    async fn create_in(uow: &C::UnitOfWork, applicant: Applicant) -> StorageResult<Applicant> {
        let created = uow.applicants().add(&applicant).await?;
        uow.save_changes().await?;
        Ok(created)
    }

    async fn update_in(
        uow: &C::UnitOfWork,
        id: i64,
        dto: ApplicantDto,
    ) -> StorageResult<Option<Applicant>> {
        let Some(mut existing) = uow.applicants().get_by_id(id).await? else {
            return Ok(None);
        };

        ApplicantMapper::apply_update(&mut existing, dto);
        let updated = uow.applicants().update(&existing).await?;
        uow.save_changes().await?;
        Ok(Some(updated))
    }

    async fn delete_in(uow: &C::UnitOfWork, id: i64) -> StorageResult<Option<bool>> {
        if !uow.applicants().exists(id).await? {
            return Ok(None);
        }

        let deleted = uow.applicants().delete(id).await?;
        uow.save_changes().await?;
        Ok(Some(deleted))
    }

    fn applicant_list_response(
        result: StorageResult<Vec<Applicant>>,
    ) -> ApiResponse<Vec<ApplicantDto>> {
        match result {
            Ok(applicants) => {
                info!("Found {} applicants", applicants.len());
                ApiResponse::success_response(
                    applicants.into_iter().map(ApplicantMapper::to_dto).collect(),
                    "Applicants retrieved successfully",
                )
            }
            Err(err) => Self::failure("Error retrieving applicants", err),
        }
    }

    fn not_found<T>(id: i64) -> ApiResponse<T> {
        warn!("Applicant not found: {}", id);
        ApiResponse::failure_response(format!("Applicant with ID {} not found", id), Vec::new())
    }

    fn failure<T>(message: &str, err: StorageError) -> ApiResponse<T> {
        error!("{}: {}", message, err);
        ApiResponse::failure_response(message, vec![err.to_string()])
    }
}
