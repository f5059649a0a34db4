//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// How long a soft-deleted event stays restorable
pub const RESTORE_WINDOW_DAYS: i64 = 7;

/// Location stored for online events, whatever was typed in
pub const ONLINE_LOCATION: &str = "線上活動";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub slug: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub image_url: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_online: bool,
    pub capacity: Option<i32>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub creator_reminder_sent: bool,
    pub creator_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Lifecycle state of this event at `now`
    pub fn lifecycle(&self, now: DateTime<Utc>) -> EventLifecycle {
        EventLifecycle::at(self.deleted_at, now)
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Public path key: the slug when assigned, the id otherwise
    pub fn public_key(&self) -> String {
        self.slug.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// Soft-delete lifecycle, derived from `deleted_at` and the current time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLifecycle {
    Active,
    /// Deleted and still restorable until `restorable_until`
    Deleted { at: DateTime<Utc>, restorable_until: DateTime<Utc> },
    /// Deleted longer ago than the restore window
    Expired { at: DateTime<Utc> },
}

impl EventLifecycle {
    /// Compute the state; the window is inclusive, so an event deleted
    /// exactly seven days ago can still be restored.
    pub fn at(deleted_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match deleted_at {
            None => EventLifecycle::Active,
            Some(at) => {
                let restorable_until = at + Duration::days(RESTORE_WINDOW_DAYS);
                if now > restorable_until {
                    EventLifecycle::Expired { at }
                } else {
                    EventLifecycle::Deleted { at, restorable_until }
                }
            }
        }
    }

    pub fn is_restorable(&self) -> bool {
        matches!(self, EventLifecycle::Deleted { .. })
    }

    pub fn is_deleted(&self) -> bool {
        !matches!(self, EventLifecycle::Active)
    }
}

/// Validated, storable event fields shared by create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub image_url: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_online: bool,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub slug: String,
    pub creator_id: Option<Uuid>,
    pub details: EventDetails,
}
