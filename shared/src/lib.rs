use serde::{Deserialize, Serialize};

/// Wire representation of an applicant, as returned by every read endpoint
/// and accepted by `PUT /api/applicants/:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicantDto {
    /// Store-assigned identity (0 until persisted)
    pub id: i64,
    pub name: String,
    /// Mandatory, max 100 characters
    pub family_name: String,
    pub address: String,
    pub country_of_origin: String,
    pub email_address: String,
    pub age: i32,
    pub hired: bool,
}

/// Body of `POST /api/applicants`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateApplicantDto {
    pub name: String,
    pub family_name: String,
    pub address: String,
    pub country_of_origin: String,
    pub email_address: String,
    pub age: i32,
    /// Defaults to `false` when omitted
    pub hired: Option<bool>,
}

/// Optional filters for `GET /api/applicants`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicantSearchRequest {
    pub hired: Option<bool>,
    /// Exact match
    pub country_of_origin: Option<String>,
    /// Case-sensitive substring match
    pub family_name: Option<String>,
    /// Inclusive lower bound
    pub min_age: Option<i32>,
    /// Inclusive upper bound
    pub max_age: Option<i32>,
}

impl ApplicantSearchRequest {
    /// True when no filter is set, i.e. the request means "list everything".
    pub fn is_empty(&self) -> bool {
        self.hired.is_none()
            && self.country_of_origin.is_none()
            && self.family_name.is_none()
            && self.min_age.is_none()
            && self.max_age.is_none()
    }
}

/// Uniform result envelope returned by every service operation.
///
/// A successful envelope always carries `data` and an empty `errors` list.
/// A failed envelope carries no `data`, a non-empty `message`, and the
/// underlying diagnostics (if any) in `errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn success_response(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn failure_response(message: impl Into<String>, errors: Vec<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "Request failed".to_string();
        }

        Self {
            success: false,
            data: None,
            message,
            errors,
        }
    }

    /// A failure without diagnostics means the requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        !self.success && self.errors.is_empty()
    }
}
