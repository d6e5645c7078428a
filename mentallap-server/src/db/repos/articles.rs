//! Article repository
//!
//! Published means `published_at IS NOT NULL`; public reads never see drafts.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::error::is_unique_violation;
use super::DbError;
use crate::models::{ArticleDraft, ArticleSection, Slug};

/// Article with its author's name
#[derive(Debug, Clone, FromRow)]
pub struct Article {
    pub id: Uuid,
    pub section: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

const ARTICLE_SELECT: &str = r#"
    SELECT a.id, a.section, a.title, a.slug, a.excerpt, a.content, a.author_id,
           u.name AS author_name, a.published_at, a.created_at, a.updated_at
    FROM articles a
    JOIN users u ON u.id = a.author_id
"#;

/// Article repository
pub struct ArticleRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ArticleRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Published articles in a section, newest first.
    pub async fn list_published(&self, section: ArticleSection) -> Result<Vec<Article>, DbError> {
        let rows = sqlx::query_as(&format!(
            r#"
            {ARTICLE_SELECT}
            WHERE a.section = $1 AND a.published_at IS NOT NULL
            ORDER BY a.published_at DESC
            "#
        ))
        .bind(section.as_str())
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_published_by_slug(&self, slug: &str) -> Result<Article, DbError> {
        sqlx::query_as(&format!(
            "{ARTICLE_SELECT} WHERE a.slug = $1 AND a.published_at IS NOT NULL"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("article", slug))
    }

    pub async fn get(&self, id: Uuid) -> Result<Article, DbError> {
        sqlx::query_as(&format!("{ARTICLE_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("article", id))
    }

    /// Drafts included, most recently edited first.
    pub async fn list_all(&self) -> Result<Vec<Article>, DbError> {
        let rows = sqlx::query_as(&format!("{ARTICLE_SELECT} ORDER BY a.updated_at DESC"))
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    async fn free_slug(&self, draft: &ArticleDraft, except: Option<Uuid>) -> Result<Slug, DbError> {
        let base = draft
            .base_slug()
            .map_err(|e| DbError::conflict("article", e.to_string()))?;
        let taken: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT slug FROM articles
            WHERE (slug = $1 OR slug LIKE $1 || '-%')
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(base.as_str())
        .bind(except)
        .fetch_all(self.pool)
        .await?;
        Ok(base.first_free(&taken))
    }

    pub async fn create(&self, author_id: Uuid, draft: &ArticleDraft) -> Result<Article, DbError> {
        let slug = self.free_slug(draft, None).await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO articles (section, title, slug, excerpt, content, author_id, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $7 THEN NOW() END)
            RETURNING id
            "#,
        )
        .bind(draft.section.as_str())
        .bind(&draft.title)
        .bind(slug.as_str())
        .bind(&draft.excerpt)
        .bind(&draft.content)
        .bind(author_id)
        .bind(draft.publish)
        .fetch_one(self.pool)
        .await
        .map_err(|e| slug_conflict(e, slug.as_str()))?;

        tracing::info!(article_id = %id, slug = %slug, published = draft.publish, "article created");
        self.get(id).await
    }

    /// Replace the article's fields. A title change regenerates the slug;
    /// `publish` keeps an existing publication date.
    pub async fn update(&self, id: Uuid, draft: &ArticleDraft) -> Result<Article, DbError> {
        let current = self.get(id).await?;
        let slug = if current.title == draft.title {
            current.slug
        } else {
            self.free_slug(draft, Some(id)).await?.into_string()
        };

        sqlx::query(
            r#"
            UPDATE articles
            SET section = $2, title = $3, slug = $4, excerpt = $5, content = $6,
                published_at = CASE WHEN $7 THEN COALESCE(published_at, NOW()) END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(draft.section.as_str())
        .bind(&draft.title)
        .bind(&slug)
        .bind(&draft.excerpt)
        .bind(&draft.content)
        .bind(draft.publish)
        .execute(self.pool)
        .await
        .map_err(|e| slug_conflict(e, &slug))?;

        self.get(id).await
    }

    pub async fn set_published(&self, id: Uuid, publish: bool) -> Result<Article, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET published_at = CASE WHEN $2 THEN COALESCE(published_at, NOW()) END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(publish)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("article", id));
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("article", id));
        }
        Ok(())
    }
}

fn slug_conflict(e: sqlx::Error, slug: &str) -> DbError {
    if is_unique_violation(&e) {
        DbError::conflict("article", format!("slug '{slug}' is already in use"))
    } else {
        DbError::Sqlx(e)
    }
}
