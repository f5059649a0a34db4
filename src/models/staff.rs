//! Staff application model

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StaffApplication {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl StaffApplication {
    /// Parsed status; unknown stored values read as pending
    pub fn status(&self) -> StaffStatus {
        self.status.parse().unwrap_or(StaffStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStaffApplicationRequest {
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffStatus {
    Pending,
    Approved,
    Rejected,
}

impl StaffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffStatus::Pending => "pending",
            StaffStatus::Approved => "approved",
            StaffStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for StaffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(StaffStatus::Pending),
            "approved" => Ok(StaffStatus::Approved),
            "rejected" => Ok(StaffStatus::Rejected),
            other => Err(format!("unknown staff status: {}", other)),
        }
    }
}
