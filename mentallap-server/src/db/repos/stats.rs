//! Aggregate queries for the admin dashboards
//!
//! Time boundaries are passed in by the caller so the same instant is used
//! for every count in one response.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;

/// Counts behind `/api/admin/stats`
#[derive(Debug, Clone, Default, FromRow)]
pub struct DashboardCounts {
    pub total_athletes: i64,
    pub pending_analyses: i64,
    pub upcoming_workshops: i64,
    pub recent_bookings: i64,
    pub active_journals: i64,
}

/// Counts behind `/api/admin/analytics`
#[derive(Debug, Clone, Default, FromRow)]
pub struct AnalyticsCounts {
    pub users_total: i64,
    pub users_athletes: i64,
    pub users_admins: i64,
    pub users_coaches: i64,
    pub users_new_this_month: i64,
    pub journal_total: i64,
    pub journal_this_week: i64,
    pub journal_avg_mood: Option<f64>,
    pub journal_avg_sleep: Option<f64>,
    pub workshops_total: i64,
    pub workshops_upcoming: i64,
    pub registrations_total: i64,
    pub articles_total: i64,
    pub articles_published: i64,
    pub analyses_total: i64,
    pub analyses_pending: i64,
    pub analyses_completed: i64,
    pub bookings_total: i64,
    pub bookings_pending: i64,
    pub bookings_completed: i64,
}

/// One workshop's price and seat count, for revenue sums
#[derive(Debug, Clone, FromRow)]
pub struct WorkshopRevenue {
    pub workshop_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub price_cents: i64,
    pub registrations: i64,
}

/// An athlete with activity counts
#[derive(Debug, Clone, FromRow)]
pub struct AthleteActivity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub sport: Option<String>,
    pub created_at: DateTime<Utc>,
    pub journal_entries: i64,
    pub analyses: i64,
    pub bookings: i64,
    pub registrations: i64,
    pub last_journal_at: Option<DateTime<Utc>>,
}

/// Stats repository
pub struct StatsRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn dashboard(
        &self,
        now: DateTime<Utc>,
        week_ago: DateTime<Utc>,
    ) -> Result<DashboardCounts, DbError> {
        let counts = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE role = 'athlete') AS total_athletes,
                (SELECT COUNT(*) FROM form_analyses
                    WHERE status IN ('submitted', 'in_review')) AS pending_analyses,
                (SELECT COUNT(*) FROM workshops WHERE starts_at >= $1) AS upcoming_workshops,
                (SELECT COUNT(*) FROM bookings WHERE created_at >= $2) AS recent_bookings,
                (SELECT COUNT(*) FROM journal_entries WHERE created_at >= $2) AS active_journals
            "#,
        )
        .bind(now)
        .bind(week_ago)
        .fetch_one(self.pool)
        .await?;
        Ok(counts)
    }

    pub async fn analytics(
        &self,
        now: DateTime<Utc>,
        week_ago: DateTime<Utc>,
        month_start: DateTime<Utc>,
    ) -> Result<AnalyticsCounts, DbError> {
        let counts = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users_total,
                (SELECT COUNT(*) FROM users WHERE role = 'athlete') AS users_athletes,
                (SELECT COUNT(*) FROM users WHERE role = 'admin') AS users_admins,
                (SELECT COUNT(*) FROM users WHERE role = 'coach') AS users_coaches,
                (SELECT COUNT(*) FROM users WHERE created_at >= $3) AS users_new_this_month,
                (SELECT COUNT(*) FROM journal_entries) AS journal_total,
                (SELECT COUNT(*) FROM journal_entries WHERE created_at >= $2) AS journal_this_week,
                (SELECT AVG(mood)::float8 FROM journal_entries) AS journal_avg_mood,
                (SELECT AVG(sleep_hours)::float8 FROM journal_entries) AS journal_avg_sleep,
                (SELECT COUNT(*) FROM workshops) AS workshops_total,
                (SELECT COUNT(*) FROM workshops WHERE starts_at >= $1) AS workshops_upcoming,
                (SELECT COUNT(*) FROM registrations) AS registrations_total,
                (SELECT COUNT(*) FROM articles) AS articles_total,
                (SELECT COUNT(*) FROM articles WHERE published_at IS NOT NULL) AS articles_published,
                (SELECT COUNT(*) FROM form_analyses) AS analyses_total,
                (SELECT COUNT(*) FROM form_analyses
                    WHERE status IN ('submitted', 'in_review')) AS analyses_pending,
                (SELECT COUNT(*) FROM form_analyses WHERE status = 'complete') AS analyses_completed,
                (SELECT COUNT(*) FROM bookings) AS bookings_total,
                (SELECT COUNT(*) FROM bookings WHERE status = 'requested') AS bookings_pending,
                (SELECT COUNT(*) FROM bookings WHERE status = 'completed') AS bookings_completed
            "#,
        )
        .bind(now)
        .bind(week_ago)
        .bind(month_start)
        .fetch_one(self.pool)
        .await?;
        Ok(counts)
    }

    /// Price and registration count for every workshop.
    pub async fn workshop_revenue(&self) -> Result<Vec<WorkshopRevenue>, DbError> {
        let rows = sqlx::query_as(
            r#"
            SELECT w.id AS workshop_id, w.starts_at, w.price_cents,
                   COUNT(r.id) AS registrations
            FROM workshops w
            LEFT JOIN registrations r ON r.workshop_id = w.id
            GROUP BY w.id
            ORDER BY w.starts_at ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Athletes newest first, each with activity counts (one query, no N+1).
    pub async fn athletes(&self) -> Result<Vec<AthleteActivity>, DbError> {
        let rows = sqlx::query_as(
            r#"
            SELECT u.id, u.name, u.email, u.sport, u.created_at,
                   (SELECT COUNT(*) FROM journal_entries j WHERE j.user_id = u.id) AS journal_entries,
                   (SELECT COUNT(*) FROM form_analyses f WHERE f.athlete_id = u.id) AS analyses,
                   (SELECT COUNT(*) FROM bookings b WHERE b.user_id = u.id) AS bookings,
                   (SELECT COUNT(*) FROM registrations r WHERE r.user_id = u.id) AS registrations,
                   (SELECT MAX(j.created_at) FROM journal_entries j WHERE j.user_id = u.id) AS last_journal_at
            FROM users u
            WHERE u.role = 'athlete'
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
