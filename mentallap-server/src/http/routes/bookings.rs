//! 1:1 session bookings between athletes and coaches

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::{booking_overview, BookingOverview};
use crate::db::{BookingDetail, BookingRepo, NewBooking, User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, CurrentUser, StaffUser, ValidUuid};
use crate::http::form::{lenient, lenient_datetime, reply, ApiJson, JsonOrForm};
use crate::http::server::AppState;
use crate::models::validation::optional_text;
use crate::models::{BookingStatus, Role, SessionType, ValidationError};

const MAX_MESSAGE_LEN: usize = 5_000;
const MAX_LINK_LEN: usize = 500;

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub athlete_id: Uuid,
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

impl From<BookingDetail> for BookingResponse {
    fn from(b: BookingDetail) -> Self {
        Self {
            id: b.id,
            athlete_id: b.user_id,
            athlete_name: b.athlete_name,
            athlete_email: b.athlete_email,
            coach_id: b.coach_id,
            coach_name: b.coach_name,
            session_type: b.session_type,
            scheduled_at: b.scheduled_at,
            message: b.message,
            external_link: b.external_link,
            status: b.status,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CoachResponse {
    pub id: Uuid,
    pub name: String,
    pub sport: Option<String>,
    pub bio: Option<String>,
}

impl From<User> for CoachResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            sport: u.sport,
            bio: u.bio,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    #[serde(default, deserialize_with = "lenient")]
    pub coach_id: Option<Uuid>,
    pub session_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

/// Staff update: advance the status and/or set the meeting link
#[derive(Debug, Deserialize)]
pub struct BookingUpdate {
    pub status: Option<String>,
    /// `""` clears the link
    pub external_link: Option<String>,
}

/// Whether `user` may see `booking`.
fn can_view(user: &User, booking: &BookingDetail) -> bool {
    user.role() == Role::Admin || booking.user_id == user.id || booking.coach_id == user.id
}

/// Whether `user` may change `booking`: its coach, or an admin.
fn can_manage(user: &User, booking: &BookingDetail) -> bool {
    user.role() == Role::Admin || booking.coach_id == user.id
}

fn check_transition(from: BookingStatus, to: BookingStatus) -> Result<(), ApiError> {
    if from.can_advance_to(to) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Cannot change booking status from {from} to {to}"
        )))
    }
}

/// POST /api/bookings
async fn create_booking(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    JsonOrForm { data: req, via_form }: JsonOrForm<BookingRequest>,
) -> Result<Response, ApiError> {
    let coach_id = req
        .coach_id
        .ok_or(ValidationError::Empty { field: "coach_id" })?;
    let session_type = SessionType::parse(req.session_type.as_deref().unwrap_or_default())?;
    let message = optional_text("message", req.message.as_deref(), MAX_MESSAGE_LEN)?;

    let booking = BookingRepo::new(&state.pool)
        .create(
            user.id,
            NewBooking {
                coach_id,
                session_type,
                scheduled_at: req.scheduled_at,
                message: message.as_deref(),
            },
        )
        .await?;

    Ok(reply(
        via_form,
        "/dashboard",
        StatusCode::CREATED,
        BookingResponse::from(booking),
    ))
}

/// GET /api/bookings - athletes see their own, coaches theirs, admins all
async fn list_bookings(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let repo = BookingRepo::new(&state.pool);
    let bookings = match user.role() {
        Role::Admin => repo.list_all().await?,
        Role::Coach => repo.list_for_coach(user.id).await?,
        Role::Athlete => repo.list_for_athlete(user.id).await?,
    };
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// GET /api/bookings/{id}
async fn get_booking(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidUuid(id): ValidUuid,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = BookingRepo::new(&state.pool).get(id).await?;
    if !can_view(&user, &booking) {
        return Err(ApiError::NotFound {
            resource: "booking",
            id: id.to_string(),
        });
    }
    Ok(Json(booking.into()))
}

/// PATCH /api/bookings/{id}
async fn update_booking(
    State(state): State<Arc<AppState>>,
    StaffUser(user): StaffUser,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<BookingUpdate>,
) -> Result<Json<BookingResponse>, ApiError> {
    let repo = BookingRepo::new(&state.pool);
    let booking = repo.get(id).await?;
    if !can_manage(&user, &booking) {
        return Err(ApiError::forbidden("Only the booking's coach can update it"));
    }

    // Validate everything before writing anything
    let status = match req.status.as_deref() {
        Some(raw) => {
            let next = BookingStatus::parse(raw)?;
            let current = booking.status()?;
            check_transition(current, next)?;
            Some((current, next))
        }
        None => None,
    };
    let link = req
        .external_link
        .as_deref()
        .map(|link| optional_text("external_link", Some(link), MAX_LINK_LEN))
        .transpose()?;

    if status.is_some() || link.is_some() {
        repo.update(id, status, link.as_ref().map(|l| l.as_deref()))
            .await?;
    }

    Ok(Json(repo.get(id).await?.into()))
}

/// GET /api/coaches
async fn list_coaches(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CoachResponse>>, ApiError> {
    let coaches = UserRepo::new(&state.pool).list_by_role(Role::Coach).await?;
    Ok(Json(coaches.into_iter().map(Into::into).collect()))
}

#[derive(Serialize)]
pub struct BookingAdminResponse {
    pub overview: BookingOverview,
    pub bookings: Vec<BookingResponse>,
}

/// GET /api/admin/bookings - newest first, with status totals
async fn admin_bookings(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<BookingAdminResponse>, ApiError> {
    let bookings = BookingRepo::new(&state.pool).list_all().await?;
    let overview = booking_overview(&bookings, Utc::now());
    Ok(Json(BookingAdminResponse {
        overview,
        bookings: bookings.into_iter().map(Into::into).collect(),
    }))
}

/// Booking routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route("/api/bookings/{id}", get(get_booking).patch(update_booking))
        .route("/api/coaches", get(list_coaches))
        .route("/api/admin/bookings", get(admin_bookings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{role}@example.com"),
            name: role.into(),
            role: role.into(),
            sport: None,
            bio: None,
            created_at: Utc::now(),
        }
    }

    fn booking(athlete: &User, coach: &User) -> BookingDetail {
        BookingDetail {
            id: Uuid::new_v4(),
            user_id: athlete.id,
            athlete_name: athlete.name.clone(),
            athlete_email: athlete.email.clone(),
            coach_id: coach.id,
            coach_name: coach.name.clone(),
            session_type: "mental".into(),
            scheduled_at: None,
            message: None,
            external_link: None,
            status: "requested".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn visibility_and_management() {
        let athlete = user("athlete");
        let coach = user("coach");
        let other_coach = user("coach");
        let admin = user("admin");
        let b = booking(&athlete, &coach);

        assert!(can_view(&athlete, &b));
        assert!(can_view(&coach, &b));
        assert!(can_view(&admin, &b));
        assert!(!can_view(&other_coach, &b));

        assert!(can_manage(&coach, &b));
        assert!(can_manage(&admin, &b));
        assert!(!can_manage(&athlete, &b));
        assert!(!can_manage(&other_coach, &b));
    }

    #[test]
    fn only_single_forward_steps() {
        use BookingStatus::*;
        assert!(check_transition(Requested, Confirmed).is_ok());
        assert!(check_transition(Confirmed, Completed).is_ok());

        let err = check_transition(Requested, Completed).unwrap_err();
        assert_eq!(
            err.public_message(),
            "Cannot change booking status from requested to completed"
        );
        assert!(check_transition(Completed, Requested).is_err());
        assert!(check_transition(Confirmed, Confirmed).is_err());
    }

    #[test]
    fn form_request_parses_coach_id() {
        let id = Uuid::new_v4();
        let req: BookingRequest = serde_json::from_str(&format!(
            r#"{{"coach_id": "{id}", "session_type": "form", "scheduled_at": "", "message": "Hi"}}"#
        ))
        .unwrap();
        assert_eq!(req.coach_id, Some(id));
        assert_eq!(req.scheduled_at, None);
    }
}
