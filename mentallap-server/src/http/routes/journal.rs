//! Journal endpoints - the signed-in user's own entries only

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::{journal_summary, JournalSummary};
use crate::db::{JournalEntry, JournalRepo, SUMMARY_WINDOW};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidUuid};
use crate::http::form::{lenient, reply, ApiJson, JsonOrForm};
use crate::http::server::AppState;
use crate::models::{JournalDraft, Paginated, Pagination, PaginationParams};

/// Tags arrive as a JSON list or as the comma-separated text of a form input
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl TagsInput {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::List(tags) => tags,
            Self::Text(text) => text.split(',').map(str::to_owned).collect(),
        }
    }
}

/// Create/update journal entry request
#[derive(Debug, Deserialize)]
pub struct JournalRequest {
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub mood: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub sleep_hours: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub rpe: Option<i64>,
    pub tags: Option<TagsInput>,
    pub notes: Option<String>,
}

impl JournalRequest {
    fn into_draft(self, today: NaiveDate) -> Result<JournalDraft, ApiError> {
        Ok(JournalDraft::new(
            self.date,
            self.mood,
            self.sleep_hours,
            self.rpe,
            self.tags.map(TagsInput::into_vec).unwrap_or_default(),
            self.notes.as_deref(),
            today,
        )?)
    }
}

/// Journal entry response
#[derive(Debug, Serialize)]
pub struct JournalEntryResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub mood: i16,
    pub sleep_hours: f64,
    pub rpe: i16,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JournalEntry> for JournalEntryResponse {
    fn from(e: JournalEntry) -> Self {
        Self {
            id: e.id,
            date: e.date,
            mood: e.mood,
            sleep_hours: e.sleep_hours,
            rpe: e.rpe,
            tags: e.tags,
            notes: e.notes,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// GET /api/journal - newest first, paginated
async fn list_entries(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<JournalEntryResponse>>, ApiError> {
    let page = Pagination::from(params);
    let entries = JournalRepo::new(&state.pool).list(user.id, page).await?;
    Ok(Json(entries.map(JournalEntryResponse::from)))
}

/// POST /api/journal
async fn create_entry(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    JsonOrForm { data: req, via_form }: JsonOrForm<JournalRequest>,
) -> Result<Response, ApiError> {
    let draft = req.into_draft(Utc::now().date_naive())?;
    let entry = JournalRepo::new(&state.pool).create(user.id, &draft).await?;
    tracing::debug!(entry_id = %entry.id, user_id = %user.id, "journal entry created");
    Ok(reply(
        via_form,
        "/journal",
        StatusCode::CREATED,
        JournalEntryResponse::from(entry),
    ))
}

/// GET /api/journal/summary
async fn summary(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<JournalSummary>, ApiError> {
    let repo = JournalRepo::new(&state.pool);
    let entries = repo.recent(user.id, SUMMARY_WINDOW).await?;
    let total = repo.count(user.id).await?;
    Ok(Json(journal_summary(&entries, total, Utc::now().date_naive())))
}

/// GET /api/journal/{id}
async fn get_entry(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidUuid(id): ValidUuid,
) -> Result<Json<JournalEntryResponse>, ApiError> {
    let entry = JournalRepo::new(&state.pool).get(user.id, id).await?;
    Ok(Json(JournalEntryResponse::from(entry)))
}

/// PUT /api/journal/{id}
async fn update_entry(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<JournalRequest>,
) -> Result<Json<JournalEntryResponse>, ApiError> {
    let draft = req.into_draft(Utc::now().date_naive())?;
    let entry = JournalRepo::new(&state.pool)
        .update(user.id, id, &draft)
        .await?;
    Ok(Json(JournalEntryResponse::from(entry)))
}

/// DELETE /api/journal/{id}
async fn delete_entry(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidUuid(id): ValidUuid,
) -> Result<StatusCode, ApiError> {
    JournalRepo::new(&state.pool).delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Journal routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/journal", get(list_entries).post(create_entry))
        .route("/api/journal/summary", get(summary))
        .route(
            "/api/journal/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 26).unwrap()
    }

    #[test]
    fn form_post_parses_strings() {
        let req: JournalRequest = parse(
            r#"{"date": "2024-01-25", "mood": "4", "sleep_hours": "7.5", "rpe": "6",
                "tags": "hurdles, Speed ,hurdles", "notes": ""}"#,
        );
        let draft = req.into_draft(today()).unwrap();
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 1, 25).unwrap());
        assert_eq!(draft.mood.get(), 4);
        assert_eq!(draft.sleep_hours.get(), 7.5);
        assert_eq!(draft.tags.as_slice().len(), 2);
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn json_body_with_tag_list_and_default_date() {
        let req: JournalRequest = parse(
            r#"{"mood": 5, "sleep_hours": 8, "rpe": 7, "tags": ["race-day"]}"#,
        );
        let draft = req.into_draft(today()).unwrap();
        assert_eq!(draft.date, today());
        assert_eq!(draft.tags.as_slice(), ["race-day".to_string()]);
    }

    #[test]
    fn missing_mood_is_rejected() {
        let req: JournalRequest = parse(r#"{"sleep_hours": 8, "rpe": 7}"#);
        assert!(matches!(
            req.into_draft(today()).unwrap_err(),
            ApiError::Validation(_)
        ));
    }

    fn parse(json: &str) -> JournalRequest {
        serde_json::from_str(json).unwrap()
    }
}
