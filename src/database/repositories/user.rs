//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::user::{User, CreateUserRequest};
use crate::utils::errors::EventDeskError;

const USER_COLUMNS: &str = "id, email, name, image, phone, role, created_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user, or refresh the profile of an existing email
    pub async fn upsert(&self, request: CreateUserRequest) -> Result<User, EventDeskError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, name, image, role, created_at)
            VALUES ($1, $2, $3, $4, 'user', $5)
            ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name, image = EXCLUDED.image
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(request.email)
        .bind(request.name)
        .bind(request.image)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, EventDeskError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, EventDeskError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Set the stored role column
    pub async fn set_role(&self, email: &str, role: &str) -> Result<bool, EventDeskError> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE email = $1")
            .bind(email)
            .bind(role)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Backfill the phone number
    pub async fn set_phone(&self, email: &str, phone: &str) -> Result<bool, EventDeskError> {
        let result = sqlx::query("UPDATE users SET phone = $2 WHERE email = $1")
            .bind(email)
            .bind(phone)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all users ordered by name
    pub async fn list(&self) -> Result<Vec<User>, EventDeskError> {
        let users = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY name ASC"))
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }
}
