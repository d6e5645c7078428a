//! Journal entry repository
//!
//! Every query is scoped by user_id: another athlete's entry is reported as not found.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;
use crate::models::{JournalDraft, Paginated, Pagination};

/// Journal entry record
#[derive(Debug, Clone, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub mood: i16,
    pub sleep_hours: f64,
    pub rpe: i16,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const ENTRY_COLUMNS: &str =
    "id, user_id, date, mood, sleep_hours, rpe, tags, notes, created_at, updated_at";

/// How many recent entries feed the summary (a year of daily entries)
pub const SUMMARY_WINDOW: i64 = 366;

/// Journal repository
pub struct JournalRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> JournalRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, draft: &JournalDraft) -> Result<JournalEntry, DbError> {
        let entry = sqlx::query_as(&format!(
            r#"
            INSERT INTO journal_entries (user_id, date, mood, sleep_hours, rpe, tags, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(draft.date)
        .bind(draft.mood.get())
        .bind(draft.sleep_hours.get())
        .bind(draft.rpe.get())
        .bind(draft.tags.as_slice())
        .bind(draft.notes.as_deref())
        .fetch_one(self.pool)
        .await?;
        Ok(entry)
    }

    /// Newest entries first; `total` counts every entry, not just this page.
    pub async fn list(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> Result<Paginated<JournalEntry>, DbError> {
        let items: Vec<JournalEntry> = sqlx::query_as(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM journal_entries
            WHERE user_id = $1
            ORDER BY date DESC, created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;
        let total = self.count(user_id).await?;

        Ok(page.wrap(items, total))
    }

    pub async fn count(&self, user_id: Uuid) -> Result<i64, DbError> {
        let total = sqlx::query_scalar("SELECT COUNT(*) FROM journal_entries WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(total)
    }

    /// Most recent entries for summary statistics.
    pub async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<JournalEntry>, DbError> {
        let entries = sqlx::query_as(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM journal_entries
            WHERE user_id = $1
            ORDER BY date DESC, created_at DESC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<JournalEntry, DbError> {
        sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("journal entry", id))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        draft: &JournalDraft,
    ) -> Result<JournalEntry, DbError> {
        sqlx::query_as(&format!(
            r#"
            UPDATE journal_entries
            SET date = $3, mood = $4, sleep_hours = $5, rpe = $6, tags = $7, notes = $8,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(draft.date)
        .bind(draft.mood.get())
        .bind(draft.sleep_hours.get())
        .bind(draft.rpe.get())
        .bind(draft.tags.as_slice())
        .bind(draft.notes.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("journal entry", id))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("journal entry", id));
        }
        Ok(())
    }
}

