//! Request bodies that arrive either as JSON or as HTML form posts
//!
//! Pages post `application/x-www-form-urlencoded` to the same endpoints the
//! JSON API uses. Form fields are always strings and blank inputs arrive as
//! `""`, so optional fields go through [`lenient`].

use std::fmt::Display;
use std::str::FromStr;

use axum::extract::{Form, FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// JSON body whose rejections (bad syntax, wrong types, missing
/// Content-Type) become 400 [`ApiError`] responses.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(Self(data))
    }
}

/// JSON or urlencoded body; `via_form` records which one arrived.
pub struct JsonOrForm<T> {
    pub data: T,
    pub via_form: bool,
}

/// True for `application/x-www-form-urlencoded` bodies (HTML form posts).
pub fn is_form_post(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form_post(req.headers()) {
            let Form(data) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(Self {
                data,
                via_form: true,
            })
        } else {
            let Json(data) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(Self {
                data,
                via_form: false,
            })
        }
    }
}

/// JSON for API callers, a redirect back to the page for form posts.
pub fn reply<B: Serialize>(via_form: bool, redirect_to: &str, status: StatusCode, body: B) -> Response {
    if via_form {
        Redirect::to(redirect_to).into_response()
    } else {
        (status, Json(body)).into_response()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Text(String),
    Value(T),
}

/// Optional field that accepts a native JSON value, a string to parse,
/// or a blank string meaning "absent".
pub fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<Lenient<T>>::deserialize(de)? {
        None => Ok(None),
        Some(Lenient::Value(v)) => Ok(Some(v)),
        Some(Lenient::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Lenient::Text(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
    }
}

/// Parse RFC 3339, or the zone-less `YYYY-MM-DDTHH:MM[:SS]` a
/// `datetime-local` input sends (taken as UTC).
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// [`lenient`] for timestamps, using [`parse_datetime`].
pub fn lenient_datetime<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(de)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_datetime(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date/time: {s}"))),
    }
}

/// Checkbox-friendly boolean: JSON bool, "true"/"on"/"1", or absent.
pub fn checkbox<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(de)? {
        None => false,
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => matches!(s.trim(), "true" | "on" | "1" | "yes"),
    })
}
