//! Workshop endpoints: public listing, registration, and admin management

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{
    Registrant, RegistrationDetail, RegistrationRepo, Workshop, WorkshopRepo, WorkshopWithCount,
    WorkshopWithRegistrants,
};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, CurrentUser, ValidUuid};
use crate::http::form::{is_form_post, lenient, lenient_datetime, ApiJson};
use crate::http::server::AppState;
use crate::models::{WorkshopDraft, WorkshopFields};

/// Workshop response; counts are present on list/get endpoints
#[derive(Debug, Serialize)]
pub struct WorkshopResponse {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats_left: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Workshop> for WorkshopResponse {
    fn from(w: Workshop) -> Self {
        Self {
            id: w.id,
            title: w.title,
            slug: w.slug,
            summary: w.summary,
            content: w.content,
            starts_at: w.starts_at,
            duration_min: w.duration_min,
            capacity: w.capacity,
            location: w.location,
            price_cents: w.price_cents,
            registration_count: None,
            seats_left: None,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

impl From<WorkshopWithCount> for WorkshopResponse {
    fn from(w: WorkshopWithCount) -> Self {
        let seats_left = w.workshop.seats_left(w.registration_count);
        Self {
            registration_count: Some(w.registration_count),
            seats_left: Some(seats_left),
            ..Self::from(w.workshop)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegistrantResponse {
    pub registration_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub sport: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl From<Registrant> for RegistrantResponse {
    fn from(r: Registrant) -> Self {
        Self {
            registration_id: r.registration_id,
            user_id: r.user_id,
            name: r.name,
            email: r.email,
            sport: r.sport,
            registered_at: r.registered_at,
        }
    }
}

/// Admin view of a workshop with its registrants
#[derive(Debug, Serialize)]
pub struct AdminWorkshopResponse {
    #[serde(flatten)]
    pub workshop: WorkshopResponse,
    pub registrations: Vec<RegistrantResponse>,
}

impl From<WorkshopWithRegistrants> for AdminWorkshopResponse {
    fn from(w: WorkshopWithRegistrants) -> Self {
        let count = w.registrants.len() as i64;
        let seats_left = w.workshop.seats_left(count);
        let mut workshop = WorkshopResponse::from(w.workshop);
        workshop.registration_count = Some(count);
        workshop.seats_left = Some(seats_left);
        Self {
            workshop,
            registrations: w.registrants.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub id: Uuid,
    pub workshop_id: Uuid,
    pub workshop_title: String,
    pub workshop_slug: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl From<RegistrationDetail> for RegistrationResponse {
    fn from(r: RegistrationDetail) -> Self {
        Self {
            id: r.id,
            workshop_id: r.workshop_id,
            workshop_title: r.workshop_title,
            workshop_slug: r.workshop_slug,
            starts_at: r.starts_at,
            location: r.location,
            created_at: r.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub registration: RegistrationResponse,
}

/// GET /api/workshops - ordered by start time with registration counts
async fn list_workshops(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<WorkshopResponse>>, ApiError> {
    let workshops = WorkshopRepo::new(&state.pool).list_with_counts().await?;
    Ok(Json(workshops.into_iter().map(Into::into).collect()))
}

/// GET /api/workshops/{id}
async fn get_workshop(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<WorkshopResponse>, ApiError> {
    let workshop = WorkshopRepo::new(&state.pool).get(id).await?;
    Ok(Json(workshop.into()))
}

/// POST /api/workshops/{id}/register
async fn register(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidUuid(id): ValidUuid,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let registration = RegistrationRepo::new(&state.pool)
        .register(user.id, id)
        .await?;

    if is_form_post(&headers) {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    Ok(Json(RegisterResponse {
        message: "Successfully registered for workshop",
        registration: registration.into(),
    })
    .into_response())
}

/// DELETE /api/workshops/{id}/register - idempotent
async fn cancel_registration(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidUuid(id): ValidUuid,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cancelled = RegistrationRepo::new(&state.pool).cancel(user.id, id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "cancelled": cancelled,
    })))
}

/// GET /api/registrations - the signed-in user's registrations
async fn my_registrations(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<RegistrationResponse>>, ApiError> {
    let registrations = RegistrationRepo::new(&state.pool)
        .list_for_user(user.id)
        .await?;
    Ok(Json(registrations.into_iter().map(Into::into).collect()))
}

/// Admin create/update request
#[derive(Debug, Deserialize)]
pub struct WorkshopRequest {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration_min: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub capacity: Option<i64>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price_cents: Option<i64>,
}

impl WorkshopRequest {
    fn to_draft(&self) -> Result<WorkshopDraft, ApiError> {
        Ok(WorkshopDraft::new(WorkshopFields {
            title: self.title.as_deref(),
            summary: self.summary.as_deref(),
            content: self.content.as_deref(),
            starts_at: self.starts_at,
            duration_min: self.duration_min,
            capacity: self.capacity,
            location: self.location.as_deref(),
            price_cents: self.price_cents,
        })?)
    }
}

/// GET /api/admin/workshops - newest first with registrants
async fn admin_list(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<AdminWorkshopResponse>>, ApiError> {
    let workshops = WorkshopRepo::new(&state.pool).list_with_registrants().await?;
    Ok(Json(workshops.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/workshops
async fn admin_create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<WorkshopRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let draft = req.to_draft()?;
    let workshop = WorkshopRepo::new(&state.pool).create(&draft).await?;
    tracing::info!(workshop_id = %workshop.id, slug = %workshop.slug, admin_id = %admin.id, "workshop created");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "workshop": WorkshopResponse::from(workshop),
        })),
    ))
}

/// GET /api/admin/workshops/{id}
async fn admin_get(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidUuid(id): ValidUuid,
) -> Result<Json<AdminWorkshopResponse>, ApiError> {
    let workshop = WorkshopRepo::new(&state.pool).get_with_registrants(id).await?;
    Ok(Json(workshop.into()))
}

/// PUT /api/admin/workshops/{id}
async fn admin_update(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<WorkshopRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let draft = req.to_draft()?;
    let workshop = WorkshopRepo::new(&state.pool).update(id, &draft).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "workshop": WorkshopResponse::from(workshop),
    })))
}

/// DELETE /api/admin/workshops/{id} - refused while registrations exist
async fn admin_delete(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ValidUuid(id): ValidUuid,
) -> Result<Json<serde_json::Value>, ApiError> {
    WorkshopRepo::new(&state.pool).delete(id).await?;
    tracing::info!(workshop_id = %id, admin_id = %admin.id, "workshop deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub workshop_id: Option<Uuid>,
}

/// Registrations for one workshop, with a mailing list
#[derive(Debug, Serialize)]
pub struct WorkshopExport {
    pub workshop_id: Uuid,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub registrations: Vec<RegistrantResponse>,
    pub emails: Vec<String>,
    pub email_string: String,
}

impl From<WorkshopWithRegistrants> for WorkshopExport {
    fn from(w: WorkshopWithRegistrants) -> Self {
        let emails: Vec<String> = w.registrants.iter().map(|r| r.email.clone()).collect();
        Self {
            workshop_id: w.workshop.id,
            title: w.workshop.title,
            starts_at: w.workshop.starts_at,
            email_string: emails.join(", "),
            emails,
            registrations: w.registrants.into_iter().map(Into::into).collect(),
        }
    }
}

/// Every workshop's export plus the combined mailing list
#[derive(Debug, Serialize)]
pub struct RegistrationExport {
    pub workshops: Vec<WorkshopExport>,
    pub all_emails: Vec<String>,
    pub all_emails_string: String,
}

impl RegistrationExport {
    fn new(workshops: Vec<WorkshopExport>) -> Self {
        let all_emails: Vec<String> = workshops
            .iter()
            .flat_map(|w| w.emails.iter().cloned())
            .collect();
        Self {
            all_emails_string: all_emails.join(", "),
            all_emails,
            workshops,
        }
    }
}

/// GET /api/admin/workshop-registrations[?workshop_id=]
async fn admin_export(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let repo = WorkshopRepo::new(&state.pool);
    let response = match params.workshop_id {
        Some(id) => {
            let export = WorkshopExport::from(repo.get_with_registrants(id).await?);
            Json(export).into_response()
        }
        None => {
            let workshops = repo
                .list_with_registrants()
                .await?
                .into_iter()
                .filter(|w| !w.registrants.is_empty())
                .map(WorkshopExport::from)
                .collect();
            Json(RegistrationExport::new(workshops)).into_response()
        }
    };
    Ok(response)
}

/// Workshop routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workshops", get(list_workshops))
        .route("/api/workshops/{id}", get(get_workshop))
        .route(
            "/api/workshops/{id}/register",
            post(register).delete(cancel_registration),
        )
        .route("/api/registrations", get(my_registrations))
        .route("/api/admin/workshops", get(admin_list).post(admin_create))
        .route(
            "/api/admin/workshops/{id}",
            get(admin_get).put(admin_update).delete(admin_delete),
        )
        .route("/api/admin/workshop-registrations", get(admin_export))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn workshop(capacity: i32) -> Workshop {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap();
        Workshop {
            id: Uuid::new_v4(),
            title: "Pre-Race Routines".into(),
            slug: "pre-race-routines".into(),
            summary: "Build a routine".into(),
            content: String::new(),
            starts_at: at,
            duration_min: 90,
            capacity,
            location: "Online".into(),
            price_cents: 4900,
            created_at: at,
            updated_at: at,
        }
    }

    fn registrant(workshop_id: Uuid, email: &str) -> Registrant {
        Registrant {
            registration_id: Uuid::new_v4(),
            workshop_id,
            user_id: Uuid::new_v4(),
            name: "Athlete".into(),
            email: email.into(),
            sport: None,
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn export_joins_emails() {
        let w = workshop(10);
        let id = w.id;
        let export = WorkshopExport::from(WorkshopWithRegistrants {
            workshop: w,
            registrants: vec![registrant(id, "a@example.com"), registrant(id, "b@example.com")],
        });
        assert_eq!(export.emails.len(), 2);
        assert_eq!(export.email_string, "a@example.com, b@example.com");

        let all = RegistrationExport::new(vec![export]);
        assert_eq!(all.all_emails_string, "a@example.com, b@example.com");
    }

    #[test]
    fn admin_response_counts_seats() {
        let w = workshop(3);
        let id = w.id;
        let response = AdminWorkshopResponse::from(WorkshopWithRegistrants {
            workshop: w,
            registrants: vec![registrant(id, "a@example.com")],
        });
        assert_eq!(response.workshop.registration_count, Some(1));
        assert_eq!(response.workshop.seats_left, Some(2));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["slug"], "pre-race-routines");
        assert_eq!(json["registrations"][0]["email"], "a@example.com");
    }

    #[test]
    fn request_from_form_strings() {
        let req: WorkshopRequest = serde_json::from_str(
            r#"{"title": "Pre-Race Routines", "summary": "Build a routine",
                "starts_at": "2030-03-09T15:00", "duration_min": "90",
                "capacity": "20", "location": "Online", "price_cents": ""}"#,
        )
        .unwrap();
        let draft = req.to_draft().unwrap();
        assert_eq!(draft.capacity, 20);
        assert_eq!(draft.price_cents, 0);
        assert_eq!(draft.content, "");
    }

    #[test]
    fn request_missing_capacity_is_rejected() {
        let req: WorkshopRequest = serde_json::from_str(
            r#"{"title": "X", "summary": "Y", "starts_at": "2030-03-09T15:00:00Z",
                "duration_min": 60, "location": "Online"}"#,
        )
        .unwrap();
        assert!(matches!(req.to_draft().unwrap_err(), ApiError::Validation(_)));
    }
}
