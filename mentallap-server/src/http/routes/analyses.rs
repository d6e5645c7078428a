//! Form analysis: athletes submit a video URL, staff review with timestamped comments

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::{analysis_overview, AnalysisOverview};
use crate::db::{Analysis, AnalysisRepo, Comment, User};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, CurrentUser, StaffUser, ValidUuid};
use crate::http::form::{lenient, reply, ApiJson, JsonOrForm};
use crate::http::server::AppState;
use crate::models::validation::{optional_text, required_text};
use crate::models::{AnalysisStatus, TrackEvent, ValidationError};

const MAX_URL_LEN: usize = 2_000;
const MAX_NOTES_LEN: usize = 5_000;
const MAX_COMMENT_LEN: usize = 5_000;
/// Longest video we expect a comment to point into (seconds)
const MAX_AT_SECOND: f64 = 6.0 * 60.0 * 60.0;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentResponse>>,
}

impl From<Analysis> for AnalysisResponse {
    fn from(a: Analysis) -> Self {
        Self {
            id: a.id,
            athlete_id: a.athlete_id,
            athlete_name: a.athlete_name,
            event: a.event,
            video_url: a.video_url,
            notes: a.notes,
            status: a.status,
            comment_count: a.comment_count,
            created_at: a.created_at,
            updated_at: a.updated_at,
            comments: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub at_second: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            author_id: c.author_id,
            author_name: c.author_name,
            at_second: c.at_second,
            comment: c.comment,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub event: Option<String>,
    pub video_url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default, deserialize_with = "lenient")]
    pub at_second: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Only http(s) links are accepted as video references.
fn video_url(raw: Option<&str>) -> Result<String, ValidationError> {
    let url = required_text("video_url", raw, MAX_URL_LEN)?;
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ValidationError::InvalidFormat {
            field: "video_url",
            reason: "must be an http(s) link",
        });
    }
    Ok(url)
}

fn at_second(raw: Option<f64>) -> Result<f64, ValidationError> {
    let at = raw.ok_or(ValidationError::Empty { field: "at_second" })?;
    if !(0.0..=MAX_AT_SECOND).contains(&at) {
        return Err(ValidationError::OutOfRange {
            field: "at_second",
            min: 0.0,
            max: MAX_AT_SECOND,
        });
    }
    Ok(at)
}

/// Owners and staff can read an analysis.
fn can_view(user: &User, analysis: &Analysis) -> bool {
    analysis.athlete_id == user.id || user.role().is_staff()
}

/// POST /api/analyses
async fn submit(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    JsonOrForm { data: req, via_form }: JsonOrForm<SubmitRequest>,
) -> Result<Response, ApiError> {
    let event = TrackEvent::parse(req.event.as_deref().unwrap_or_default())?;
    let url = video_url(req.video_url.as_deref())?;
    let notes = optional_text("notes", req.notes.as_deref(), MAX_NOTES_LEN)?;

    let analysis = AnalysisRepo::new(&state.pool)
        .create(user.id, event, &url, notes.as_deref())
        .await?;

    Ok(reply(
        via_form,
        "/form-analysis",
        StatusCode::CREATED,
        AnalysisResponse::from(analysis),
    ))
}

/// GET /api/analyses - own submissions, or every submission for staff
async fn list(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<AnalysisResponse>>, ApiError> {
    let repo = AnalysisRepo::new(&state.pool);
    let analyses = if user.role().is_staff() {
        repo.list_all().await?
    } else {
        repo.list_for_athlete(user.id).await?
    };
    Ok(Json(analyses.into_iter().map(Into::into).collect()))
}

/// GET /api/analyses/{id} - with comments ordered by timestamp
async fn get_one(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidUuid(id): ValidUuid,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let found = AnalysisRepo::new(&state.pool).get_with_comments(id).await?;
    if !can_view(&user, &found.analysis) {
        return Err(ApiError::NotFound {
            resource: "analysis",
            id: id.to_string(),
        });
    }

    let mut response = AnalysisResponse::from(found.analysis);
    response.comments = Some(found.comments.into_iter().map(Into::into).collect());
    Ok(Json(response))
}

/// POST /api/analyses/{id}/comments
async fn add_comment(
    State(state): State<Arc<AppState>>,
    StaffUser(user): StaffUser,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let at = at_second(req.at_second)?;
    let text = required_text("comment", req.comment.as_deref(), MAX_COMMENT_LEN)?;

    let comment = AnalysisRepo::new(&state.pool)
        .add_comment(id, user.id, at, &text)
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// PATCH /api/analyses/{id}
async fn set_status(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<StatusRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let status = AnalysisStatus::parse(&req.status)?;
    let repo = AnalysisRepo::new(&state.pool);
    repo.set_status(id, status).await?;
    Ok(Json(repo.get(id).await?.into()))
}

#[derive(Serialize)]
pub struct AnalysisAdminResponse {
    pub overview: AnalysisOverview,
    pub analyses: Vec<AnalysisResponse>,
}

/// GET /api/admin/form-analysis
async fn admin_overview(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<AnalysisAdminResponse>, ApiError> {
    let analyses = AnalysisRepo::new(&state.pool).list_all().await?;
    let overview = analysis_overview(&analyses, Utc::now().date_naive());
    Ok(Json(AnalysisAdminResponse {
        overview,
        analyses: analyses.into_iter().map(Into::into).collect(),
    }))
}

/// Form analysis routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/analyses", get(list).post(submit))
        .route("/api/analyses/{id}", get(get_one).patch(set_status))
        .route("/api/analyses/{id}/comments", post(add_comment))
        .route("/api/admin/form-analysis", get(admin_overview))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_url_must_be_http() {
        assert_eq!(
            video_url(Some(" https://youtu.be/abc ")).unwrap(),
            "https://youtu.be/abc"
        );
        assert!(matches!(
            video_url(Some("ftp://example.com/race.mp4")).unwrap_err(),
            ValidationError::InvalidFormat { field: "video_url", .. }
        ));
        assert!(matches!(
            video_url(None).unwrap_err(),
            ValidationError::Empty { field: "video_url" }
        ));
    }

    #[test]
    fn comment_timestamp_range() {
        assert_eq!(at_second(Some(12.5)).unwrap(), 12.5);
        assert!(at_second(Some(-1.0)).is_err());
        assert!(at_second(None).is_err());
    }

    #[test]
    fn owners_and_staff_can_view() {
        let now = Utc::now();
        let athlete_id = Uuid::new_v4();
        let analysis = Analysis {
            id: Uuid::new_v4(),
            athlete_id,
            athlete_name: "Athlete".into(),
            event: "hurdles_110".into(),
            video_url: "https://youtu.be/abc".into(),
            notes: None,
            status: "submitted".into(),
            comment_count: 0,
            created_at: now,
            updated_at: now,
        };
        let user = |id: Uuid, role: &str| User {
            id,
            email: "x@example.com".into(),
            name: "X".into(),
            role: role.into(),
            sport: None,
            bio: None,
            created_at: now,
        };

        assert!(can_view(&user(athlete_id, "athlete"), &analysis));
        assert!(can_view(&user(Uuid::new_v4(), "coach"), &analysis));
        assert!(can_view(&user(Uuid::new_v4(), "admin"), &analysis));
        assert!(!can_view(&user(Uuid::new_v4(), "athlete"), &analysis));
    }
}
