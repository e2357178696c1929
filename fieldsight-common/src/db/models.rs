//! Database models
//!
//! Row types map one-to-one onto the tables created in [`super::init`].
//! Timestamps are stored as RFC 3339 text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Grouping of teams working on the same staff project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StaffProject {
    pub id: i64,
    pub name: String,
    pub created_by: Option<i64>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: i64,
    pub leader_id: Option<i64>,
    pub name: String,
    pub created_by: Option<i64>,
    pub staff_project_id: Option<i64>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Staff {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub team_id: Option<i64>,
    pub gender: Option<String>,
    pub ethnicity: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub photo: Option<String>,
    pub designation: Option<String>,
    pub created_by: Option<i64>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Published form definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct XForm {
    pub id: i64,
    pub id_string: String,
    pub title: String,
    pub user_id: i64,
}

/// One submitted survey response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Instance {
    pub id: i64,
    pub xform_id: i64,
    pub uuid: String,
    pub xml: String,
    pub created_at: DateTime<Utc>,
}

/// Media file uploaded with an instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attachment {
    pub id: i64,
    pub instance_id: i64,
    /// Storage-relative file name
    pub media_file: String,
    pub mimetype: String,
}

/// FieldSight wrapper linking an instance to its site/project and review status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FInstance {
    pub id: i64,
    pub instance_id: i64,
    pub site_id: Option<i64>,
    pub project_id: Option<i64>,
    pub site_fxf_id: Option<i64>,
    pub project_fxf_id: Option<i64>,
    pub form_status: i64,
    pub submitted_by: Option<i64>,
    pub date: DateTime<Utc>,
}

/// Review status transition of an [`FInstance`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InstanceStatusChange {
    pub id: i64,
    pub finstance_id: i64,
    pub message: String,
    pub old_status: i64,
    pub new_status: i64,
    pub user_id: Option<i64>,
    pub date: DateTime<Utc>,
}

/// Review status of a submitted form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    Pending,
    Rejected,
    Flagged,
    Approved,
}

impl FormStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Rejected),
            2 => Some(Self::Flagged),
            3 => Some(Self::Approved),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::Rejected => 1,
            Self::Flagged => 2,
            Self::Approved => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Rejected => "Rejected",
            Self::Flagged => "Flagged",
            Self::Approved => "Approved",
        }
    }

    /// Display label for a stored code, empty for unknown codes
    pub fn label_for(code: i64) -> &'static str {
        Self::from_code(code).map(Self::label).unwrap_or("")
    }
}
