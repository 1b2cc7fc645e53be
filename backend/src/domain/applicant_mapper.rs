//! Conversions between the wire types in `shared` and the `Applicant` entity.

use shared::{ApplicantDto, ApplicantSearchRequest, CreateApplicantDto};

use crate::domain::models::{Applicant, ApplicantField, ApplicantPredicate, UNASSIGNED_ID};
use crate::storage::predicate::Predicate;

/// Mapper to convert between shared applicant DTOs and the domain model.
pub struct ApplicantMapper;

impl ApplicantMapper {
    /// Converts a domain Applicant to its wire form. Absent fields become "".
    pub fn to_dto(domain: Applicant) -> ApplicantDto {
        ApplicantDto {
            id: domain.id,
            name: domain.name.unwrap_or_default(),
            family_name: domain.family_name,
            address: domain.address.unwrap_or_default(),
            country_of_origin: domain.country_of_origin.unwrap_or_default(),
            email_address: domain.email_address.unwrap_or_default(),
            age: domain.age,
            hired: domain.hired,
        }
    }

    /// Builds an unpersisted applicant from a create request; `hired` defaults to false.
    pub fn from_create_request(request: CreateApplicantDto) -> Applicant {
        Applicant {
            id: UNASSIGNED_ID,
            name: optional(request.name),
            family_name: request.family_name,
            address: optional(request.address),
            country_of_origin: optional(request.country_of_origin),
            email_address: optional(request.email_address),
            age: request.age,
            hired: request.hired.unwrap_or(false),
        }
    }

    /// Overwrites every mutable field of `existing`. The identity is kept.
    pub fn apply_update(existing: &mut Applicant, dto: ApplicantDto) {
        existing.name = optional(dto.name);
        existing.family_name = dto.family_name;
        existing.address = optional(dto.address);
        existing.country_of_origin = optional(dto.country_of_origin);
        existing.email_address = optional(dto.email_address);
        existing.age = dto.age;
        existing.hired = dto.hired;
    }

    /// Translates search filters into a predicate. No filters yields `Always`.
    pub fn search_predicate(request: &ApplicantSearchRequest) -> ApplicantPredicate {
        let mut predicate = Predicate::Always;

        if let Some(hired) = request.hired {
            predicate = predicate.and(Predicate::eq(ApplicantField::Hired, hired));
        }
        if let Some(country) = &request.country_of_origin {
            predicate = predicate.and(Predicate::eq(ApplicantField::CountryOfOrigin, country.as_str()));
        }
        if let Some(family_name) = &request.family_name {
            predicate = predicate.and(Predicate::contains(
                ApplicantField::FamilyName,
                family_name.as_str(),
            ));
        }
        if let Some(min_age) = request.min_age {
            predicate = predicate.and(Predicate::ge(ApplicantField::Age, min_age));
        }
        if let Some(max_age) = request.max_age {
            predicate = predicate.and(Predicate::le(ApplicantField::Age, max_age));
        }

        predicate
    }
}

fn optional(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
