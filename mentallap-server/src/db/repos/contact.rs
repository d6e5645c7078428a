//! Contact message repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;
use crate::models::ContactKind;

/// Stored contact form submission
#[derive(Debug, Clone, FromRow)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub kind: String,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields of a contact form submission
#[derive(Debug, Clone)]
pub struct NewContactMessage<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub subject: Option<&'a str>,
    pub message: &'a str,
    pub kind: ContactKind,
}

const CONTACT_COLUMNS: &str = "id, name, email, subject, message, kind, processed, created_at";

/// Contact message repository
pub struct ContactRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, msg: &NewContactMessage<'_>) -> Result<ContactMessage, DbError> {
        let row = sqlx::query_as(&format!(
            r#"
            INSERT INTO contact_messages (name, email, subject, message, kind)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(msg.name)
        .bind(msg.email)
        .bind(msg.subject)
        .bind(msg.message)
        .bind(msg.kind.as_str())
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Unprocessed first, then newest first.
    pub async fn list(&self) -> Result<Vec<ContactMessage>, DbError> {
        let rows = sqlx::query_as(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_messages ORDER BY processed ASC, created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn set_processed(&self, id: Uuid, processed: bool) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE contact_messages SET processed = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(processed)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("contact message", id));
        }
        Ok(())
    }
}
