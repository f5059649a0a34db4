//! Attendee repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::attendee::{Attendee, CreateAttendeeRequest, PhoneLookup};
use crate::utils::errors::EventDeskError;
use super::conflict_or_database;

const ATTENDEE_COLUMNS: &str = "id, event_id, name, email, phone, phone_key, checked_in, check_in_time, created_at";

#[derive(Clone)]
pub struct AttendeeRepository {
    pool: PgPool,
}

impl AttendeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register an attendee
    pub async fn create(&self, request: CreateAttendeeRequest) -> Result<Attendee, EventDeskError> {
        let attendee = sqlx::query_as::<_, Attendee>(&format!(
            r#"
            INSERT INTO attendees (id, event_id, name, email, phone, phone_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ATTENDEE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(request.event_id)
        .bind(request.name)
        .bind(request.email)
        .bind(request.phone)
        .bind(request.phone_key)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "attendee"))?;

        Ok(attendee)
    }

    /// Any attendee of the event sharing the email or the phone key
    pub async fn find_conflicting(&self, event_id: Uuid, email: &str, phone_key: &str) -> Result<Option<Attendee>, EventDeskError> {
        let attendee = sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE event_id = $1 AND (email = $2 OR phone_key = $3) LIMIT 1"
        ))
        .bind(event_id)
        .bind(email)
        .bind(phone_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendee)
    }

    /// Find attendee by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Attendee>, EventDeskError> {
        let attendee = sqlx::query_as::<_, Attendee>(&format!("SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(attendee)
    }

    /// Find the attendee a check-in phone refers to
    pub async fn find_by_phone(&self, event_id: Uuid, lookup: &PhoneLookup) -> Result<Option<Attendee>, EventDeskError> {
        let (column, value) = match lookup {
            PhoneLookup::Raw(phone) => ("phone", phone),
            PhoneLookup::Key(key) => ("phone_key", key),
        };

        let attendee = sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE event_id = $1 AND {column} = $2 LIMIT 1"
        ))
        .bind(event_id)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendee)
    }

    /// Flip the check-in flag
    pub async fn mark_checked_in(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), EventDeskError> {
        let result = sqlx::query("UPDATE attendees SET checked_in = TRUE, check_in_time = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(EventDeskError::AttendeeNotFound { attendee_id: id });
        }

        Ok(())
    }

    /// Attendees of one event, newest first
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<Attendee>, EventDeskError> {
        let attendees = sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE event_id = $1 ORDER BY created_at DESC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attendees)
    }

    /// Every attendee, newest first
    pub async fn list_all(&self) -> Result<Vec<Attendee>, EventDeskError> {
        let attendees = sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(attendees)
    }

    /// Delete attendee
    pub async fn delete(&self, id: Uuid) -> Result<bool, EventDeskError> {
        let result = sqlx::query("DELETE FROM attendees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
