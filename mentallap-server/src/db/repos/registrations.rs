//! Workshop registration repository
//!
//! Registration runs in one transaction that locks the workshop row, so the
//! capacity check and the insert cannot interleave with another registration.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;

pub const ALREADY_REGISTERED: &str = "Already registered for this workshop";
pub const WORKSHOP_FULL: &str = "Workshop is full";

/// Registration joined with its workshop, for the athlete's dashboard
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workshop_id: Uuid,
    pub workshop_title: String,
    pub workshop_slug: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

const DETAIL_SELECT: &str = r#"
    SELECT r.id, r.user_id, r.workshop_id, w.title AS workshop_title,
           w.slug AS workshop_slug, w.starts_at, w.location, r.created_at
    FROM registrations r
    JOIN workshops w ON w.id = r.workshop_id
"#;

/// Registration repository
pub struct RegistrationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> RegistrationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register a user for a workshop.
    ///
    /// Errors: `NotFound` for an unknown workshop, `Conflict` when the user is
    /// already registered or every seat is taken.
    pub async fn register(
        &self,
        user_id: Uuid,
        workshop_id: Uuid,
    ) -> Result<RegistrationDetail, DbError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent registrations for the same workshop
        let capacity: Option<i32> =
            sqlx::query_scalar("SELECT capacity FROM workshops WHERE id = $1 FOR UPDATE")
                .bind(workshop_id)
                .fetch_optional(&mut *tx)
                .await?;
        let capacity = capacity.ok_or_else(|| DbError::not_found("workshop", workshop_id))?;

        let (taken, already): (i64, bool) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(BOOL_OR(user_id = $2), FALSE)
            FROM registrations
            WHERE workshop_id = $1
            "#,
        )
        .bind(workshop_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already {
            return Err(DbError::conflict("registration", ALREADY_REGISTERED));
        }
        if taken >= i64::from(capacity) {
            return Err(DbError::conflict("registration", WORKSHOP_FULL));
        }

        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO registrations (user_id, workshop_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, workshop_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(workshop_id)
        .fetch_optional(&mut *tx)
        .await?;
        let id = id.ok_or_else(|| DbError::conflict("registration", ALREADY_REGISTERED))?;

        let detail = sqlx::query_as(&format!("{DETAIL_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(%user_id, %workshop_id, "workshop registration created");
        Ok(detail)
    }

    /// Cancel the user's own registration. Idempotent; returns whether a row was removed.
    pub async fn cancel(&self, user_id: Uuid, workshop_id: Uuid) -> Result<bool, DbError> {
        let result =
            sqlx::query("DELETE FROM registrations WHERE user_id = $1 AND workshop_id = $2")
                .bind(user_id)
                .bind(workshop_id)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The user's registrations, soonest workshop first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RegistrationDetail>, DbError> {
        let rows = sqlx::query_as(&format!(
            "{DETAIL_SELECT} WHERE r.user_id = $1 ORDER BY w.starts_at ASC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrate, NewUser, UserRepo, WorkshopRepo};
    use crate::models::{Email, Role, WorkshopDraft, WorkshopFields};

    async fn setup() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.unwrap();
        migrate(&pool).await.unwrap();
        pool
    }

    async fn athlete(pool: &PgPool) -> Uuid {
        let email = Email::new(&format!("reg-{}@example.com", Uuid::new_v4())).unwrap();
        UserRepo::new(pool)
            .create(NewUser {
                email: &email,
                password_hash: "x",
                name: "Reg Test",
                role: Role::Athlete,
                sport: None,
                bio: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn workshop(pool: &PgPool, capacity: i64) -> Uuid {
        let draft = WorkshopDraft::new(WorkshopFields {
            title: Some("Capacity Test"),
            summary: Some("Seats"),
            starts_at: Some(Utc::now()),
            duration_min: Some(60),
            capacity: Some(capacity),
            location: Some("Virtual"),
            ..Default::default()
        })
        .unwrap();
        WorkshopRepo::new(pool).create(&draft).await.unwrap().id
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_then_full() {
        let pool = setup().await;
        let repo = RegistrationRepo::new(&pool);
        let ws = workshop(&pool, 1).await;
        let first = athlete(&pool).await;
        let second = athlete(&pool).await;

        repo.register(first, ws).await.unwrap();

        let dup = repo.register(first, ws).await.unwrap_err();
        assert!(matches!(dup, DbError::Conflict { ref reason, .. } if reason == ALREADY_REGISTERED));

        let full = repo.register(second, ws).await.unwrap_err();
        assert!(matches!(full, DbError::Conflict { ref reason, .. } if reason == WORKSHOP_FULL));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_registrations_respect_capacity() {
        let pool = setup().await;
        let ws = workshop(&pool, 3).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                let user = athlete(&pool).await;
                RegistrationRepo::new(&pool).register(user, ws).await.is_ok()
            }));
        }

        let mut ok = 0;
        for h in handles {
            if h.await.unwrap() {
                ok += 1;
            }
        }
        assert_eq!(ok, 3);
    }
}
