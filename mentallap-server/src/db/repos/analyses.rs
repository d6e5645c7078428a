//! Form analysis repository (videos and timestamped coach comments)

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;
use crate::models::{AnalysisStatus, TrackEvent};

/// Analysis joined with the athlete's name
#[derive(Debug, Clone, FromRow)]
pub struct Analysis {
    pub id: Uuid,
    pub athlete_id: Uuid,
    pub athlete_name: String,
    pub event: String,
    pub video_url: String,
    pub notes: Option<String>,
    pub status: String,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Analysis {
    pub fn status(&self) -> Result<AnalysisStatus, DbError> {
        AnalysisStatus::parse(&self.status).map_err(|_| DbError::Corrupt {
            field: "analysis status",
            value: self.status.clone(),
        })
    }
}

/// Timestamped comment with its author's name
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub analysis_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub at_second: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Analysis with comments ordered by video position
#[derive(Debug, Clone)]
pub struct AnalysisWithComments {
    pub analysis: Analysis,
    pub comments: Vec<Comment>,
}

const ANALYSIS_SELECT: &str = r#"
    SELECT f.id, f.athlete_id, u.name AS athlete_name, f.event, f.video_url, f.notes,
           f.status, COUNT(c.id) AS comment_count, f.created_at, f.updated_at
    FROM form_analyses f
    JOIN users u ON u.id = f.athlete_id
    LEFT JOIN form_comments c ON c.analysis_id = f.id
"#;

const ANALYSIS_GROUP: &str = "GROUP BY f.id, u.name";

/// Form analysis repository
pub struct AnalysisRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalysisRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Submit a video for review; status starts at `submitted`.
    pub async fn create(
        &self,
        athlete_id: Uuid,
        event: TrackEvent,
        video_url: &str,
        notes: Option<&str>,
    ) -> Result<Analysis, DbError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO form_analyses (athlete_id, event, video_url, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(athlete_id)
        .bind(event.as_str())
        .bind(video_url)
        .bind(notes)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(analysis_id = %id, %athlete_id, %event, "form analysis submitted");
        self.get(id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Analysis, DbError> {
        sqlx::query_as(&format!("{ANALYSIS_SELECT} WHERE f.id = $1 {ANALYSIS_GROUP}"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("form analysis", id))
    }

    pub async fn get_with_comments(&self, id: Uuid) -> Result<AnalysisWithComments, DbError> {
        let analysis = self.get(id).await?;
        let comments = self.comments(id).await?;
        Ok(AnalysisWithComments { analysis, comments })
    }

    /// An athlete's submissions, newest first.
    pub async fn list_for_athlete(&self, athlete_id: Uuid) -> Result<Vec<Analysis>, DbError> {
        let rows = sqlx::query_as(&format!(
            "{ANALYSIS_SELECT} WHERE f.athlete_id = $1 {ANALYSIS_GROUP} ORDER BY f.created_at DESC"
        ))
        .bind(athlete_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Every submission, newest first (coach and admin queue).
    pub async fn list_all(&self) -> Result<Vec<Analysis>, DbError> {
        let rows = sqlx::query_as(&format!(
            "{ANALYSIS_SELECT} {ANALYSIS_GROUP} ORDER BY f.created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn comments(&self, analysis_id: Uuid) -> Result<Vec<Comment>, DbError> {
        let rows = sqlx::query_as(
            r#"
            SELECT c.id, c.analysis_id, c.author_id, u.name AS author_name,
                   c.at_second, c.comment, c.created_at
            FROM form_comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.analysis_id = $1
            ORDER BY c.at_second ASC, c.created_at ASC
            "#,
        )
        .bind(analysis_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Add a comment; a `submitted` analysis moves to `in_review` in the same transaction.
    pub async fn add_comment(
        &self,
        analysis_id: Uuid,
        author_id: Uuid,
        at_second: f64,
        comment: &str,
    ) -> Result<Comment, DbError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM form_analyses WHERE id = $1)")
                .bind(analysis_id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(DbError::not_found("form analysis", analysis_id));
        }

        let comment: Comment = sqlx::query_as(
            r#"
            WITH inserted AS (
                INSERT INTO form_comments (analysis_id, author_id, at_second, comment)
                VALUES ($1, $2, $3, $4)
                RETURNING id, analysis_id, author_id, at_second, comment, created_at
            )
            SELECT i.id, i.analysis_id, i.author_id, u.name AS author_name,
                   i.at_second, i.comment, i.created_at
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(analysis_id)
        .bind(author_id)
        .bind(at_second)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE form_analyses SET status = 'in_review', updated_at = NOW()
            WHERE id = $1 AND status = 'submitted'
            "#,
        )
        .bind(analysis_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(comment)
    }

    pub async fn set_status(&self, id: Uuid, status: AnalysisStatus) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE form_analyses SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("form analysis", id));
        }
        tracing::info!(analysis_id = %id, %status, "form analysis status set");
        Ok(())
    }
}
