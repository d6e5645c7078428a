//! Booking repository
//!
//! Status changes are conditional on the status the caller saw, so two
//! concurrent updates cannot both advance the same booking.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;
use crate::models::{BookingStatus, SessionType};

/// Booking joined with athlete and coach names
#[derive(Debug, Clone, FromRow)]
pub struct BookingDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub athlete_name: String,
    pub athlete_email: String,
    pub coach_id: Uuid,
    pub coach_name: String,
    pub session_type: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub message: Option<String>,
    pub external_link: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingDetail {
    pub fn status(&self) -> Result<BookingStatus, DbError> {
        BookingStatus::parse(&self.status).map_err(|_| DbError::Corrupt {
            field: "booking status",
            value: self.status.clone(),
        })
    }

    pub fn session_type(&self) -> Result<SessionType, DbError> {
        SessionType::parse(&self.session_type).map_err(|_| DbError::Corrupt {
            field: "session type",
            value: self.session_type.clone(),
        })
    }
}

/// Fields of a new booking request
#[derive(Debug, Clone)]
pub struct NewBooking<'a> {
    pub coach_id: Uuid,
    pub session_type: SessionType,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub message: Option<&'a str>,
}

pub const NOT_A_COACH: &str = "Selected user is not a coach";

const DETAIL_SELECT: &str = r#"
    SELECT b.id, b.user_id, a.name AS athlete_name, a.email AS athlete_email,
           b.coach_id, c.name AS coach_name, b.session_type, b.scheduled_at,
           b.message, b.external_link, b.status, b.created_at, b.updated_at
    FROM bookings b
    JOIN users a ON a.id = b.user_id
    JOIN users c ON c.id = b.coach_id
"#;

/// Booking repository
pub struct BookingRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> BookingRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Request a session. The insert only happens when `coach_id` is a coach.
    pub async fn create(&self, user_id: Uuid, booking: NewBooking<'_>) -> Result<BookingDetail, DbError> {
        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (user_id, coach_id, session_type, scheduled_at, message)
            SELECT $1, u.id, $3, $4, $5
            FROM users u
            WHERE u.id = $2 AND u.role = 'coach'
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(booking.coach_id)
        .bind(booking.session_type.as_str())
        .bind(booking.scheduled_at)
        .bind(booking.message)
        .fetch_optional(self.pool)
        .await?;

        let id = id.ok_or_else(|| DbError::conflict("booking", NOT_A_COACH))?;
        tracing::info!(booking_id = %id, %user_id, coach_id = %booking.coach_id, "booking requested");
        self.get(id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<BookingDetail, DbError> {
        sqlx::query_as(&format!("{DETAIL_SELECT} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("booking", id))
    }

    /// Bookings requested by an athlete, newest first.
    pub async fn list_for_athlete(&self, user_id: Uuid) -> Result<Vec<BookingDetail>, DbError> {
        let rows = sqlx::query_as(&format!(
            "{DETAIL_SELECT} WHERE b.user_id = $1 ORDER BY b.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Bookings addressed to a coach, newest first.
    pub async fn list_for_coach(&self, coach_id: Uuid) -> Result<Vec<BookingDetail>, DbError> {
        let rows = sqlx::query_as(&format!(
            "{DETAIL_SELECT} WHERE b.coach_id = $1 ORDER BY b.created_at DESC"
        ))
        .bind(coach_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_all(&self) -> Result<Vec<BookingDetail>, DbError> {
        let rows = sqlx::query_as(&format!("{DETAIL_SELECT} ORDER BY b.created_at DESC"))
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Apply a status step and/or a meeting-link change in one statement.
    ///
    /// `status` is `(from, to)`; the write is refused as a conflict if the
    /// booking is no longer in `from`. `external_link` of `Some(None)` clears it.
    pub async fn update(
        &self,
        id: Uuid,
        status: Option<(BookingStatus, BookingStatus)>,
        external_link: Option<Option<&str>>,
    ) -> Result<(), DbError> {
        let from = status.map(|(from, _)| from.as_str());
        let to = status.map(|(_, to)| to.as_str());
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = COALESCE($2, status),
                external_link = CASE WHEN $3 THEN $4 ELSE external_link END,
                updated_at = NOW()
            WHERE id = $1 AND ($5::text IS NULL OR status = $5)
            "#,
        )
        .bind(id)
        .bind(to)
        .bind(external_link.is_some())
        .bind(external_link.flatten())
        .bind(from)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(match status {
                Some((from, _)) => DbError::conflict("booking", format!("booking is no longer {from}")),
                None => DbError::not_found("booking", id),
            });
        }
        if let Some((from, to)) = status {
            tracing::info!(booking_id = %id, %from, %to, "booking status changed");
        }
        if external_link.is_some() {
            tracing::debug!(booking_id = %id, "booking link updated");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(status: &str) -> BookingDetail {
        BookingDetail {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            athlete_name: "Alex Runner".into(),
            athlete_email: "alex.runner@example.com".into(),
            coach_id: Uuid::new_v4(),
            coach_name: "Coach Mike".into(),
            session_type: "form".into(),
            scheduled_at: None,
            message: None,
            external_link: None,
            status: status.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parses_stored_enums() {
        let b = detail("confirmed");
        assert_eq!(b.status().unwrap(), BookingStatus::Confirmed);
        assert_eq!(b.session_type().unwrap(), SessionType::Form);
    }

    #[test]
    fn corrupt_status_is_reported() {
        assert!(matches!(
            detail("cancelled").status().unwrap_err(),
            DbError::Corrupt { field: "booking status", .. }
        ));
    }
}
