//! Staff application repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::staff::{StaffApplication, StaffStatus, CreateStaffApplicationRequest};
use crate::utils::errors::EventDeskError;
use super::conflict_or_database;

const APPLICATION_COLUMNS: &str = "id, event_id, name, email, phone, message, status, created_at";

#[derive(Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending application
    pub async fn create(&self, request: CreateStaffApplicationRequest) -> Result<StaffApplication, EventDeskError> {
        let application = sqlx::query_as::<_, StaffApplication>(&format!(
            r#"
            INSERT INTO staff_applications (id, event_id, name, email, phone, message, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(request.event_id)
        .bind(request.name)
        .bind(request.email)
        .bind(request.phone)
        .bind(request.message)
        .bind(StaffStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "staff application"))?;

        Ok(application)
    }

    /// Find the application of an email for an event
    pub async fn find_for_event(&self, event_id: Uuid, email: &str) -> Result<Option<StaffApplication>, EventDeskError> {
        let application = sqlx::query_as::<_, StaffApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM staff_applications WHERE event_id = $1 AND email = $2"
        ))
        .bind(event_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    /// Find application by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<StaffApplication>, EventDeskError> {
        let application = sqlx::query_as::<_, StaffApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM staff_applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    /// Update application status
    pub async fn update_status(&self, id: Uuid, status: StaffStatus) -> Result<Option<StaffApplication>, EventDeskError> {
        let application = sqlx::query_as::<_, StaffApplication>(&format!(
            "UPDATE staff_applications SET status = $2 WHERE id = $1 RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    /// Applications for one event, newest first
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<StaffApplication>, EventDeskError> {
        let applications = sqlx::query_as::<_, StaffApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM staff_applications WHERE event_id = $1 ORDER BY created_at DESC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    /// Applications submitted with an email, newest first
    pub async fn list_for_email(&self, email: &str) -> Result<Vec<StaffApplication>, EventDeskError> {
        let applications = sqlx::query_as::<_, StaffApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM staff_applications WHERE LOWER(email) = LOWER($1) ORDER BY created_at DESC"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }
}
