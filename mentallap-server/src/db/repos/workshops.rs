//! Workshop repository
//!
//! - list: LEFT JOIN with registration count (no N+1)
//! - slugs: derived from the title and suffixed `-1`, `-2`, ... until free
//! - delete: refused while any registration references the workshop

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::error::{is_foreign_key_violation, is_unique_violation};
use super::DbError;
use crate::models::{Slug, WorkshopDraft};

/// Workshop record
#[derive(Debug, Clone, FromRow)]
pub struct Workshop {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub starts_at: DateTime<Utc>,
    pub duration_min: i32,
    pub capacity: i32,
    pub location: String,
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workshop {
    pub fn seats_left(&self, registered: i64) -> i64 {
        (i64::from(self.capacity) - registered).max(0)
    }
}

/// Workshop with its registration count
#[derive(Debug, Clone, FromRow)]
pub struct WorkshopWithCount {
    #[sqlx(flatten)]
    pub workshop: Workshop,
    pub registration_count: i64,
}

/// A registered athlete as shown to admins
#[derive(Debug, Clone, FromRow)]
pub struct Registrant {
    pub registration_id: Uuid,
    pub workshop_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub sport: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// Workshop with everyone registered for it
#[derive(Debug, Clone)]
pub struct WorkshopWithRegistrants {
    pub workshop: Workshop,
    pub registrants: Vec<Registrant>,
}

const WORKSHOP_COLUMNS: &str = "w.id, w.title, w.slug, w.summary, w.content, w.starts_at, \
     w.duration_min, w.capacity, w.location, w.price_cents, w.created_at, w.updated_at";

/// Workshop repository
pub struct WorkshopRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> WorkshopRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every workshop, soonest first, with registration counts.
    pub async fn list_with_counts(&self) -> Result<Vec<WorkshopWithCount>, DbError> {
        let rows = sqlx::query_as(&format!(
            r#"
            SELECT {WORKSHOP_COLUMNS}, COUNT(r.id) AS registration_count
            FROM workshops w
            LEFT JOIN registrations r ON r.workshop_id = w.id
            GROUP BY w.id
            ORDER BY w.starts_at ASC
            "#
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: Uuid) -> Result<WorkshopWithCount, DbError> {
        sqlx::query_as(&format!(
            r#"
            SELECT {WORKSHOP_COLUMNS}, COUNT(r.id) AS registration_count
            FROM workshops w
            LEFT JOIN registrations r ON r.workshop_id = w.id
            WHERE w.id = $1
            GROUP BY w.id
            "#
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("workshop", id))
    }

    /// Admin view: every workshop, latest first, with its registrants (two queries total).
    pub async fn list_with_registrants(&self) -> Result<Vec<WorkshopWithRegistrants>, DbError> {
        let workshops: Vec<Workshop> = sqlx::query_as(&format!(
            "SELECT {WORKSHOP_COLUMNS} FROM workshops w ORDER BY w.starts_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<Uuid> = workshops.iter().map(|w| w.id).collect();
        let mut by_workshop: HashMap<Uuid, Vec<Registrant>> = HashMap::new();
        for registrant in self.registrants_for(&ids).await? {
            by_workshop
                .entry(registrant.workshop_id)
                .or_default()
                .push(registrant);
        }

        Ok(workshops
            .into_iter()
            .map(|workshop| WorkshopWithRegistrants {
                registrants: by_workshop.remove(&workshop.id).unwrap_or_default(),
                workshop,
            })
            .collect())
    }

    pub async fn get_with_registrants(&self, id: Uuid) -> Result<WorkshopWithRegistrants, DbError> {
        let workshop = self.get(id).await?.workshop;
        let registrants = self.registrants_for(&[id]).await?;
        Ok(WorkshopWithRegistrants {
            workshop,
            registrants,
        })
    }

    async fn registrants_for(&self, workshop_ids: &[Uuid]) -> Result<Vec<Registrant>, DbError> {
        let rows = sqlx::query_as(
            r#"
            SELECT r.id AS registration_id, r.workshop_id, u.id AS user_id,
                   u.name, u.email, u.sport, r.created_at AS registered_at
            FROM registrations r
            JOIN users u ON u.id = r.user_id
            WHERE r.workshop_id = ANY($1)
            ORDER BY r.created_at ASC
            "#,
        )
        .bind(workshop_ids)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Slugs equal to `base` or of the form `base-*`, optionally ignoring one workshop.
    async fn taken_slugs(&self, base: &Slug, except: Option<Uuid>) -> Result<Vec<String>, DbError> {
        let slugs = sqlx::query_scalar(
            r#"
            SELECT slug FROM workshops
            WHERE (slug = $1 OR slug LIKE $1 || '-%')
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(base.as_str())
        .bind(except)
        .fetch_all(self.pool)
        .await?;
        Ok(slugs)
    }

    pub async fn create(&self, draft: &WorkshopDraft) -> Result<Workshop, DbError> {
        let base = draft
            .base_slug()
            .map_err(|e| DbError::conflict("workshop", e.to_string()))?;
        let slug = base.first_free(&self.taken_slugs(&base, None).await?);

        let created: Workshop = sqlx::query_as(&format!(
            r#"
            INSERT INTO workshops AS w
                (title, slug, summary, content, starts_at, duration_min, capacity, location, price_cents)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {WORKSHOP_COLUMNS}
            "#
        ))
        .bind(&draft.title)
        .bind(slug.as_str())
        .bind(&draft.summary)
        .bind(&draft.content)
        .bind(draft.starts_at)
        .bind(draft.duration_min)
        .bind(draft.capacity)
        .bind(&draft.location)
        .bind(draft.price_cents)
        .fetch_one(self.pool)
        .await
        .map_err(|e| slug_conflict(e, slug.as_str()))?;

        tracing::info!(workshop_id = %created.id, slug = %slug, "workshop created");
        Ok(created)
    }

    /// Replace every field; the slug is regenerated only when the title changed.
    pub async fn update(&self, id: Uuid, draft: &WorkshopDraft) -> Result<Workshop, DbError> {
        let current = self.get(id).await?.workshop;

        let slug = if current.title == draft.title {
            current.slug
        } else {
            let base = draft
                .base_slug()
                .map_err(|e| DbError::conflict("workshop", e.to_string()))?;
            base.first_free(&self.taken_slugs(&base, Some(id)).await?)
                .into_string()
        };

        sqlx::query_as(&format!(
            r#"
            UPDATE workshops AS w
            SET title = $2, slug = $3, summary = $4, content = $5, starts_at = $6,
                duration_min = $7, capacity = $8, location = $9, price_cents = $10,
                updated_at = NOW()
            WHERE w.id = $1
            RETURNING {WORKSHOP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&slug)
        .bind(&draft.summary)
        .bind(&draft.content)
        .bind(draft.starts_at)
        .bind(draft.duration_min)
        .bind(draft.capacity)
        .bind(&draft.location)
        .bind(draft.price_cents)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| slug_conflict(e, &slug))?
        .ok_or_else(|| DbError::not_found("workshop", id))
    }

    /// Delete a workshop that nobody is registered for.
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            DELETE FROM workshops w
            WHERE w.id = $1
              AND NOT EXISTS (SELECT 1 FROM registrations r WHERE r.workshop_id = w.id)
            "#,
        )
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                has_registrations()
            } else {
                DbError::Sqlx(e)
            }
        })?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM workshops WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        if exists {
            Err(has_registrations())
        } else {
            Err(DbError::not_found("workshop", id))
        }
    }
}

fn has_registrations() -> DbError {
    DbError::conflict("workshop", "Cannot delete a workshop with registrations")
}

fn slug_conflict(e: sqlx::Error, slug: &str) -> DbError {
    if is_unique_violation(&e) {
        DbError::conflict("workshop", format!("slug '{slug}' is already in use"))
    } else {
        DbError::Sqlx(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workshop(capacity: i32) -> Workshop {
        Workshop {
            id: Uuid::new_v4(),
            title: "College Recruiting 101".into(),
            slug: "college-recruiting-101".into(),
            summary: "Navigate the recruiting process".into(),
            content: String::new(),
            starts_at: Utc::now(),
            duration_min: 90,
            capacity,
            location: "Virtual".into(),
            price_cents: 4900,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn seats_left_never_negative() {
        let w = workshop(20);
        assert_eq!(w.seats_left(0), 20);
        assert_eq!(w.seats_left(19), 1);
        assert_eq!(w.seats_left(25), 0);
    }
}
