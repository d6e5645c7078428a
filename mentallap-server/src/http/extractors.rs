//! Custom Axum extractors
//!
//! API guards reject with JSON (`401`/`403`); page guards redirect instead.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use uuid::Uuid;

use super::cookies::session_token;
use super::error::ApiError;
use super::server::AppState;
use crate::auth::resolve_session;
use crate::db::User;
use crate::models::{Role, ValidationError};

async fn session_user(parts: &Parts, state: &AppState) -> Result<Option<User>, ApiError> {
    let Some(token) = session_token(&parts.headers) else {
        return Ok(None);
    };
    Ok(resolve_session(&state.pool, &token).await?)
}

/// Signed-in user (401 otherwise)
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        session_user(parts, state)
            .await?
            .map(Self)
            .ok_or_else(ApiError::unauthorized)
    }
}

/// Signed-in admin (401 when signed out, 403 for other roles)
pub struct AdminUser(pub User);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role() != Role::Admin {
            return Err(ApiError::forbidden("Admin access required"));
        }
        Ok(Self(user))
    }
}

/// Signed-in coach or admin
pub struct StaffUser(pub User);

impl FromRequestParts<Arc<AppState>> for StaffUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role().is_staff() {
            return Err(ApiError::forbidden("Coach or admin access required"));
        }
        Ok(Self(user))
    }
}

/// Optional user for public pages. Lookup failures count as signed out.
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match session_user(parts, state).await {
            Ok(user) => Ok(Self(user)),
            Err(e) => {
                tracing::warn!(error = ?e, "session lookup failed, treating as signed out");
                Ok(Self(None))
            }
        }
    }
}

pub const SIGN_IN_PAGE: &str = "/auth/signin";
pub const DASHBOARD_PAGE: &str = "/dashboard";

/// Signed-in user for pages; redirects to the sign-in page otherwise.
pub struct PageUser(pub User);

impl FromRequestParts<Arc<AppState>> for PageUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match session_user(parts, state).await {
            Ok(Some(user)) => Ok(Self(user)),
            Ok(None) => Err(Redirect::to(SIGN_IN_PAGE).into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}

/// Admin for pages; other signed-in users go back to their dashboard.
pub struct PageAdmin(pub User);

impl FromRequestParts<Arc<AppState>> for PageAdmin {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let PageUser(user) = PageUser::from_request_parts(parts, state).await?;
        if user.role() != Role::Admin {
            return Err(Redirect::to(DASHBOARD_PAGE).into_response());
        }
        Ok(Self(user))
    }
}

/// Extract and validate a UUID from path
pub struct ValidUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidUuid
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        let uuid = Uuid::parse_str(&id).map_err(|_| {
            ApiError::Validation(ValidationError::InvalidFormat {
                field: "id",
                reason: "invalid UUID format",
            })
        })?;

        Ok(Self(uuid))
    }
}
