pub mod applicant;

pub use applicant::{
    Applicant, ApplicantField, ApplicantPredicate, ApplicantValidationError, UNASSIGNED_ID,
};
