//! Domain model for a job applicant.
use serde::{Deserialize, Serialize};

use crate::storage::predicate::{Field, Predicate, Record, Value};

/// Identity carried by an applicant that has not been persisted yet
pub const UNASSIGNED_ID: i64 = 0;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_FAMILY_NAME_LENGTH: usize = 100;
pub const MAX_ADDRESS_LENGTH: usize = 200;
pub const MAX_COUNTRY_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: i64,
    pub name: Option<String>,
    pub family_name: String,
    pub address: Option<String>,
    pub country_of_origin: Option<String>,
    pub email_address: Option<String>,
    pub age: i32,
    pub hired: bool,
}

/// Predicate over applicant columns, as accepted by `Repository::find`
pub type ApplicantPredicate = Predicate<ApplicantField>;

impl Applicant {
    pub fn is_persisted(&self) -> bool {
        self.id != UNASSIGNED_ID
    }

    /// Check the rules every stored applicant must satisfy.
    pub fn validate(&self) -> Result<(), ApplicantValidationError> {
        if self.family_name.trim().is_empty() {
            return Err(ApplicantValidationError::EmptyFamilyName);
        }
        check_length("FamilyName", Some(&self.family_name), MAX_FAMILY_NAME_LENGTH)?;
        check_length("Name", self.name.as_deref(), MAX_NAME_LENGTH)?;
        check_length("Address", self.address.as_deref(), MAX_ADDRESS_LENGTH)?;
        check_length(
            "CountryOfOrigin",
            self.country_of_origin.as_deref(),
            MAX_COUNTRY_LENGTH,
        )?;
        check_length("EmailAddress", self.email_address.as_deref(), MAX_EMAIL_LENGTH)?;

        if self.age < 0 {
            return Err(ApplicantValidationError::NegativeAge(self.age));
        }

        Ok(())
    }
}

fn check_length(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ApplicantValidationError> {
    match value {
        Some(text) if text.chars().count() > max => {
            Err(ApplicantValidationError::TooLong { field, max })
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplicantValidationError {
    #[error("FamilyName cannot be empty")]
    EmptyFamilyName,
    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("Age cannot be negative (got {0})")]
    NegativeAge(i32),
}

/// Columns of the `applicants` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicantField {
    Id,
    Name,
    FamilyName,
    Address,
    CountryOfOrigin,
    EmailAddress,
    Age,
    Hired,
}

impl Field for ApplicantField {
    fn column(&self) -> &'static str {
        match self {
            ApplicantField::Id => "id",
            ApplicantField::Name => "name",
            ApplicantField::FamilyName => "family_name",
            ApplicantField::Address => "address",
            ApplicantField::CountryOfOrigin => "country_of_origin",
            ApplicantField::EmailAddress => "email_address",
            ApplicantField::Age => "age",
            ApplicantField::Hired => "hired",
        }
    }
}

impl Record<ApplicantField> for Applicant {
    fn value(&self, field: ApplicantField) -> Value {
        match field {
            ApplicantField::Id => self.id.into(),
            ApplicantField::Name => self.name.clone().into(),
            ApplicantField::FamilyName => self.family_name.clone().into(),
            ApplicantField::Address => self.address.clone().into(),
            ApplicantField::CountryOfOrigin => self.country_of_origin.clone().into(),
            ApplicantField::EmailAddress => self.email_address.clone().into(),
            ApplicantField::Age => self.age.into(),
            ApplicantField::Hired => self.hired.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applicant() -> Applicant {
        Applicant {
            id: UNASSIGNED_ID,
            name: Some("Ahmed".to_string()),
            family_name: "Alaa".to_string(),
            address: Some("Abbas el Akkad St".to_string()),
            country_of_origin: Some("Egypt".to_string()),
            email_address: Some("ahmed@test.com".to_string()),
            age: 25,
            hired: false,
        }
    }

    #[test]
    fn test_valid_applicant() {
        assert!(applicant().validate().is_ok());
        assert!(!applicant().is_persisted());
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let minimal = Applicant {
            name: None,
            address: None,
            country_of_origin: None,
            email_address: None,
            ..applicant()
        };
        assert!(minimal.validate().is_ok());
    }

    #[test]
    fn test_family_name_is_mandatory() {
        let mut a = applicant();
        a.family_name = "   ".to_string();
        assert_eq!(a.validate(), Err(ApplicantValidationError::EmptyFamilyName));
    }

    #[test]
    fn test_length_limits() {
        let mut a = applicant();
        a.address = Some("x".repeat(200));
        assert!(a.validate().is_ok());

        a.address = Some("x".repeat(201));
        assert_eq!(
            a.validate(),
            Err(ApplicantValidationError::TooLong {
                field: "Address",
                max: 200
            })
        );

        let mut b = applicant();
        b.email_address = Some("e".repeat(101));
        assert!(matches!(
            b.validate(),
            Err(ApplicantValidationError::TooLong { field: "EmailAddress", .. })
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let mut a = applicant();
        a.family_name = "ع".repeat(100);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_negative_age_rejected() {
        let mut a = applicant();
        a.age = -1;
        assert_eq!(a.validate(), Err(ApplicantValidationError::NegativeAge(-1)));
    }

    #[test]
    fn test_record_values() {
        let a = applicant();
        assert_eq!(a.value(ApplicantField::Age), Value::Integer(25));
        assert_eq!(a.value(ApplicantField::Hired), Value::Bool(false));
        assert_eq!(
            Applicant { name: None, ..a }.value(ApplicantField::Name),
            Value::Null
        );
    }
}
