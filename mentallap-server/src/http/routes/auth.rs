//! Sign-up, sign-in and sign-out, as a JSON API and as HTML forms

use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{self, AuthError, SignUp};
use crate::db::User;
use crate::http::cookies::{clear_session, session_token, set_session};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, DASHBOARD_PAGE};
use crate::http::form::ApiJson;
use crate::http::server::AppState;
use crate::views;

#[derive(Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    pub role: Option<String>,
    pub sport: Option<String>,
}

impl SignUpRequest {
    fn as_sign_up(&self) -> SignUp<'_> {
        SignUp {
            email: &self.email,
            password: &self.password,
            name: &self.name,
            role: self.role.as_deref(),
            sport: self.sport.as_deref(),
        }
    }
}

#[derive(Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of an account
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub sport: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            sport: u.sport,
            bio: u.bio,
            created_at: u.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
}

/// Create a session for `user` and attach the cookie to `body`.
async fn open_session(
    state: &AppState,
    user: &User,
    body: impl IntoResponse,
) -> Result<Response, ApiError> {
    let token = auth::start_session(&state.pool, user.id, state.config.session_ttl()).await?;
    let cookie = set_session(
        &token,
        state.config.session_ttl(),
        state.config.session.secure_cookie,
    );
    tracing::info!(user_id = %user.id, "session started");
    Ok(([cookie], body).into_response())
}

/// Delete the request's session (if any) and clear the cookie.
async fn close_session(state: &AppState, headers: &HeaderMap, body: impl IntoResponse) -> Response {
    if let Some(token) = session_token(headers) {
        if let Err(e) = auth::end_session(&state.pool, &token).await {
            tracing::warn!(error = %e, "failed to delete session");
        }
    }
    ([clear_session(state.config.session.secure_cookie)], body).into_response()
}

/// POST /api/auth/signup
async fn api_sign_up(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignUpRequest>,
) -> Result<Response, ApiError> {
    let user = auth::sign_up(&state.pool, req.as_sign_up()).await?;
    let body = (
        StatusCode::CREATED,
        Json(SessionResponse {
            user: UserResponse::from(user.clone()),
        }),
    );
    open_session(&state, &user, body).await
}

/// POST /api/auth/signin
async fn api_sign_in(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignInRequest>,
) -> Result<Response, ApiError> {
    let user = auth::sign_in(&state.pool, &req.email, &req.password).await?;
    let body = Json(SessionResponse {
        user: UserResponse::from(user.clone()),
    });
    open_session(&state, &user, body).await
}

/// POST /api/auth/signout
async fn api_sign_out(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    close_session(&state, &headers, Json(serde_json::json!({ "success": true }))).await
}

/// GET /api/auth/me
async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Status and message to show on a re-rendered form
fn form_failure(e: AuthError) -> Result<(StatusCode, String), ApiError> {
    match ApiError::from(e) {
        err @ (ApiError::Database(_) | ApiError::Internal { .. }) => Err(err),
        err => Ok((err.status(), err.public_message())),
    }
}

async fn sign_in_page() -> Html<String> {
    Html(views::sign_in(None))
}

async fn sign_up_page() -> Html<String> {
    Html(views::sign_up(None))
}

/// POST /auth/signin (form)
async fn form_sign_in(
    State(state): State<Arc<AppState>>,
    Form(req): Form<SignInRequest>,
) -> Result<Response, ApiError> {
    match auth::sign_in(&state.pool, &req.email, &req.password).await {
        Ok(user) => open_session(&state, &user, Redirect::to(DASHBOARD_PAGE)).await,
        Err(e) => {
            let (status, message) = form_failure(e)?;
            Ok((status, Html(views::sign_in(Some(&message)))).into_response())
        }
    }
}

/// POST /auth/signup (form)
async fn form_sign_up(
    State(state): State<Arc<AppState>>,
    Form(req): Form<SignUpRequest>,
) -> Result<Response, ApiError> {
    match auth::sign_up(&state.pool, req.as_sign_up()).await {
        Ok(user) => open_session(&state, &user, Redirect::to(DASHBOARD_PAGE)).await,
        Err(e) => {
            let (status, message) = form_failure(e)?;
            Ok((status, Html(views::sign_up(Some(&message)))).into_response())
        }
    }
}

/// POST /auth/signout (form)
async fn form_sign_out(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    close_session(&state, &headers, Redirect::to("/")).await
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/signup", post(api_sign_up))
        .route("/api/auth/signin", post(api_sign_in))
        .route("/api/auth/signout", post(api_sign_out))
        .route("/api/auth/me", get(me))
        .route("/auth/signin", get(sign_in_page).post(form_sign_in))
        .route("/auth/signup", get(sign_up_page).post(form_sign_up))
        .route("/auth/signout", post(form_sign_out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use crate::models::{Role, ValidationError};

    #[test]
    fn form_failures_keep_user_facing_messages() {
        let (status, message) = form_failure(AuthError::InvalidCredentials).unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Invalid email or password");

        let (status, message) = form_failure(AuthError::Db(DbError::conflict(
            "user",
            "User already exists",
        )))
        .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "User already exists");

        let (status, _) =
            form_failure(AuthError::Validation(ValidationError::Empty { field: "name" })).unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = form_failure(AuthError::RoleNotAllowed(Role::Admin)).unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_failures_are_not_rendered() {
        assert!(form_failure(AuthError::Hash("boom".into())).is_err());
        assert!(form_failure(AuthError::Db(DbError::Sqlx(sqlx::Error::PoolTimedOut))).is_err());
    }

    #[test]
    fn user_response_copies_fields() {
        let user = User {
            id: Uuid::new_v4(),
            email: "coach@thementallap.com".into(),
            name: "Coach".into(),
            role: "coach".into(),
            sport: Some("Track & Field".into()),
            bio: None,
            created_at: Utc::now(),
        };
        let response = UserResponse::from(user.clone());
        assert_eq!(response.id, user.id);
        assert_eq!(response.role, "coach");
    }
}
