//! Attendee model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attendee {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    /// Phone as typed at registration, kept for display
    pub phone: String,
    /// Digits-only phone used for matching
    pub phone_key: String,
    pub checked_in: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Attendee {
    pub fn status_label(&self) -> &'static str {
        if self.checked_in {
            "已報到"
        } else {
            "未報到"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAttendeeRequest {
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub phone_key: String,
}

/// Phone lookup used by check-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneLookup {
    /// Match the stored raw phone exactly
    Raw(String),
    /// Match the stored digits-only key
    Key(String),
}
