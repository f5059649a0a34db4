//! Event repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::event::{Event, EventDetails, CreateEventRequest};
use crate::utils::errors::EventDeskError;
use super::conflict_or_database;

const EVENT_COLUMNS: &str = "id, slug, title, description, location, location_lat, location_lng, image_url, \
    start_time, end_time, is_online, capacity, deleted_at, creator_reminder_sent, creator_id, created_at, updated_at";

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, request: CreateEventRequest) -> Result<Event, EventDeskError> {
        let details = request.details;
        let now = Utc::now();
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (id, slug, title, description, location, location_lat, location_lng, image_url,
                                start_time, end_time, is_online, capacity, creator_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(request.slug)
        .bind(details.title)
        .bind(details.description)
        .bind(details.location)
        .bind(details.location_lat)
        .bind(details.location_lng)
        .bind(details.image_url)
        .bind(details.start_time)
        .bind(details.end_time)
        .bind(details.is_online)
        .bind(details.capacity)
        .bind(request.creator_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "event slug"))?;

        Ok(event)
    }

    /// Find event by ID, deleted or not
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, EventDeskError> {
        let event = sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Find event by slug, deleted or not
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, EventDeskError> {
        let event = sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Check whether any event row holds the slug
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, EventDeskError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM events WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists.0)
    }

    /// Replace the editable fields of an event
    pub async fn update(&self, id: Uuid, details: EventDetails) -> Result<Option<Event>, EventDeskError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                location = $4,
                location_lat = $5,
                location_lng = $6,
                image_url = $7,
                start_time = $8,
                end_time = $9,
                is_online = $10,
                capacity = $11,
                updated_at = $12
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(details.title)
        .bind(details.description)
        .bind(details.location)
        .bind(details.location_lat)
        .bind(details.location_lng)
        .bind(details.image_url)
        .bind(details.start_time)
        .bind(details.end_time)
        .bind(details.is_online)
        .bind(details.capacity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Set or clear the soft-delete timestamp
    pub async fn set_deleted_at(&self, id: Uuid, deleted_at: Option<DateTime<Utc>>) -> Result<bool, EventDeskError> {
        let result = sqlx::query("UPDATE events SET deleted_at = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(deleted_at)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List events, newest start time first
    pub async fn list(&self, include_deleted: bool) -> Result<Vec<Event>, EventDeskError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE ($1 OR deleted_at IS NULL) ORDER BY start_time DESC"
        ))
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Events whose creator still needs the pre-event reminder
    pub async fn pending_reminder(&self, now: DateTime<Utc>, until: DateTime<Utc>) -> Result<Vec<Event>, EventDeskError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE start_time > $1 AND start_time <= $2
              AND creator_reminder_sent = FALSE
              AND creator_id IS NOT NULL
              AND deleted_at IS NULL
            ORDER BY start_time ASC
            "#
        ))
        .bind(now)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Flag the creator reminder as delivered
    pub async fn mark_reminder_sent(&self, id: Uuid) -> Result<(), EventDeskError> {
        sqlx::query("UPDATE events SET creator_reminder_sent = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get attendee count for event
    pub async fn attendee_count(&self, event_id: Uuid) -> Result<i64, EventDeskError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attendees WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
