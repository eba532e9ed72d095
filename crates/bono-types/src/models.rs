use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed benefit amount granted per application, in RD$.
pub const BENEFIT_AMOUNT: u32 = 5000;

/// Note attached to the application created at registration.
pub const INITIAL_NOTE: &str = "Solicitud inicial registrada";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Stored users keep their password verbatim; `check_credentials` compares
/// it with an exact string match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    pub cedula: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Review state of an application.
///
/// Stored as its wire string. Values written by something other than this
/// crate load as `Unknown` and are written back untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Paid,
    Unknown(String),
}

impl ApplicationStatus {
    /// Every status the review workflow can assign.
    pub const KNOWN: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::UnderReview,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::Paid,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Paid => "paid",
            ApplicationStatus::Unknown(raw) => raw,
        }
    }

    /// Approved and paid both count as a granted benefit.
    pub fn is_granted(&self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Paid)
    }
}

impl From<String> for ApplicationStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => ApplicationStatus::Pending,
            "under_review" => ApplicationStatus::UnderReview,
            "approved" => ApplicationStatus::Approved,
            "rejected" => ApplicationStatus::Rejected,
            "paid" => ApplicationStatus::Paid,
            _ => ApplicationStatus::Unknown(raw),
        }
    }
}

impl From<ApplicationStatus> for String {
    fn from(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status: {0}")]
pub struct UnknownStatus(pub String);

/// Strict parse: only the five workflow states are accepted.
impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match ApplicationStatus::from(s.to_string()) {
            ApplicationStatus::Unknown(raw) => Err(UnknownStatus(raw)),
            status => Ok(status),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Documents {
    pub cedula: bool,
    pub bank_statement: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: ApplicationStatus,
    pub amount: u32,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub documents: Documents,
    #[serde(default)]
    pub notes: String,
}
