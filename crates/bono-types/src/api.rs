use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Application, ApplicationStatus, User};

// -- Registration --

/// Raw form input. Text fields are trimmed by the workflow, passwords are not.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub cedula: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub terms_accepted: bool,
}

/// Form field an error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    FirstName,
    LastName,
    Cedula,
    Email,
    Phone,
    Password,
    ConfirmPassword,
    Terms,
}

impl FieldId {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::FirstName => "firstName",
            FieldId::LastName => "lastName",
            FieldId::Cedula => "cedula",
            FieldId::Email => "email",
            FieldId::Phone => "phone",
            FieldId::Password => "password",
            FieldId::ConfirmPassword => "confirmPassword",
            FieldId::Terms => "terms",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: FieldId,
    pub message: String,
}

impl FieldError {
    pub fn new(field: FieldId, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RegisterOutcome {
    /// Both records were written.
    Registered { user: User, application: Application },
    /// Nothing was written; every failing field is listed.
    Rejected { errors: Vec<FieldError> },
}

impl RegisterOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, RegisterOutcome::Registered { .. })
    }

    pub fn errors(&self) -> &[FieldError] {
        match self {
            RegisterOutcome::Registered { .. } => &[],
            RegisterOutcome::Rejected { errors } => errors,
        }
    }
}

// -- Status display --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Pending,
}

/// Progress of one application through documents, approval and deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusIndicators {
    pub documents: StepState,
    pub approval: StepState,
    pub deposit: StepState,
}

// -- Dashboard --

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub status_text: &'static str,
    pub submitted_at: DateTime<Utc>,
    pub indicators: StatusIndicators,
}

/// One line of the admin review list.
#[derive(Debug, Clone, Serialize)]
pub struct AdminRow {
    pub application_id: Uuid,
    pub applicant_name: String,
    pub cedula: String,
    pub submitted_at: DateTime<Utc>,
    pub amount: u32,
    pub status: ApplicationStatus,
    pub status_text: &'static str,
    pub status_class: &'static str,
    /// Only pending applications offer approve/reject actions.
    pub actionable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub counts: StatusCounts,
    pub rows: Vec<AdminRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user_name: String,
    pub role_label: &'static str,
    pub latest: Option<ApplicationSummary>,
    pub admin: Option<AdminOverview>,
}
