//! Admin analytics, user management and the mail check

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::{
    admin_stats, analytics_report, athlete_summary, is_active, month_start, week_ago,
    AdminStats, AnalyticsReport, AthleteSummary,
};
use crate::db::{AthleteActivity, StatsRepo, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::AdminUser;
use crate::http::form::ApiJson;
use crate::http::routes::auth::UserResponse;
use crate::http::server::AppState;
use crate::mail::{send_test_email, MailError};
use crate::models::{Email, Role};

/// GET /api/admin/stats
async fn stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<AdminStats>, ApiError> {
    let now = Utc::now();
    let repo = StatsRepo::new(&state.pool);
    let counts = repo.dashboard(now, week_ago(now)).await?;
    let revenue = repo.workshop_revenue().await?;
    Ok(Json(admin_stats(&counts, &revenue, now)))
}

/// GET /api/admin/analytics
async fn analytics(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<AnalyticsReport>, ApiError> {
    let now = Utc::now();
    let repo = StatsRepo::new(&state.pool);
    let counts = repo.analytics(now, week_ago(now), month_start(now)).await?;
    let revenue = repo.workshop_revenue().await?;
    Ok(Json(analytics_report(&counts, &revenue, now)))
}

#[derive(Debug, Serialize)]
pub struct AthleteResponse {
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
    pub active: bool,
}

impl AthleteResponse {
    fn new(a: AthleteActivity, now: DateTime<Utc>) -> Self {
        let active = is_active(&a, now);
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            sport: a.sport,
            created_at: a.created_at,
            journal_entries: a.journal_entries,
            analyses: a.analyses,
            bookings: a.bookings,
            registrations: a.registrations,
            last_journal_at: a.last_journal_at,
            active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AthletesResponse {
    pub summary: AthleteSummary,
    pub athletes: Vec<AthleteResponse>,
}

/// GET /api/admin/athletes - newest first
async fn athletes(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<AthletesResponse>, ApiError> {
    let now = Utc::now();
    let rows = StatsRepo::new(&state.pool).athletes().await?;
    let summary = athlete_summary(&rows, now);
    Ok(Json(AthletesResponse {
        summary,
        athletes: rows.into_iter().map(|a| AthleteResponse::new(a, now)).collect(),
    }))
}

/// GET /api/admin/users
async fn users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = UserRepo::new(&state.pool).list_all().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub email: String,
    pub role: String,
}

/// POST /api/admin/users/role
async fn set_role(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<RoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let email = Email::new(&req.email)?;
    let role = Role::parse(&req.role)?;
    if email.as_str() == admin.email && role != Role::Admin {
        return Err(ApiError::bad_request("Admins cannot remove their own admin role"));
    }

    let user = UserRepo::new(&state.pool).set_role(&email, role).await?;
    tracing::info!(user_id = %user.id, %role, by = %admin.id, "role changed");
    Ok(Json(user.into()))
}

#[derive(Debug, Default, Deserialize)]
pub struct TestEmailRequest {
    #[serde(alias = "to")]
    pub recipient: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TestEmailResponse {
    pub success: bool,
    pub message: String,
    pub transport: &'static str,
    pub recipient: String,
}

impl TestEmailResponse {
    fn new(outcome: Result<(), MailError>, transport: &'static str, recipient: String) -> Self {
        let (success, message) = match outcome {
            Ok(()) => (true, "Test email sent".to_owned()),
            Err(e) => (false, e.to_string()),
        };
        Self {
            success,
            message,
            transport,
            recipient,
        }
    }
}

/// POST /api/admin/test-email - defaults to the support address
async fn test_email_handler(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: TestEmailRequest = if body.is_empty() {
        TestEmailRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(e.to_string()))?
    };
    let recipient = match req.recipient.as_deref().map(str::trim) {
        Some(to) if !to.is_empty() => Email::new(to)?.as_str().to_owned(),
        _ => state.config.contact.support_email.clone(),
    };

    let outcome = send_test_email(state.mailer.as_ref(), &recipient).await;
    let result = TestEmailResponse::new(outcome, state.mailer.transport(), recipient);
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(result)).into_response())
}

/// Admin routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/analytics", get(analytics))
        .route("/api/admin/athletes", get(athletes))
        .route("/api/admin/users", get(users))
        .route("/api/admin/users/role", post(set_role))
        .route("/api/admin/test-email", post(test_email_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_email_outcome() {
        let ok = TestEmailResponse::new(Ok(()), "memory", "coach@example.com".into());
        assert!(ok.success);
        assert_eq!(ok.message, "Test email sent");

        let failed = TestEmailResponse::new(
            Err(MailError::Transport("connection refused".into())),
            "smtp",
            "coach@example.com".into(),
        );
        assert!(!failed.success);
        assert!(failed.message.contains("connection refused"));
    }

    #[test]
    fn athlete_active_flag() {
        let now = Utc::now();
        let row = |last: Option<DateTime<Utc>>| AthleteActivity {
            id: Uuid::new_v4(),
            name: "Athlete".into(),
            email: "a@example.com".into(),
            sport: Some("Track & Field".into()),
            created_at: now - Duration::days(40),
            journal_entries: 3,
            analyses: 0,
            bookings: 1,
            registrations: 0,
            last_journal_at: last,
        };

        assert!(AthleteResponse::new(row(Some(now - Duration::days(2))), now).active);
        assert!(!AthleteResponse::new(row(Some(now - Duration::days(9))), now).active);
        assert!(!AthleteResponse::new(row(None), now).active);
    }
}
