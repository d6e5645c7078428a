//! Contact form: stored and forwarded to the team, best effort

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{ContactMessage, ContactRepo, NewContactMessage};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, ValidUuid};
use crate::http::form::{reply, ApiJson, JsonOrForm};
use crate::http::server::AppState;
use crate::mail::templates::{contact_confirmation, contact_notification, ContactRouting};
use crate::mail::Mailer;
use crate::models::validation::{optional_text, required_text};
use crate::models::{ContactKind, Email, PersonName};

const MAX_SUBJECT_LEN: usize = 200;
const MAX_MESSAGE_LEN: usize = 10_000;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactReply {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ContactMessageResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ContactMessage> for ContactMessageResponse {
    fn from(m: ContactMessage) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            subject: m.subject,
            message: m.message,
            kind: m.kind,
            processed: m.processed,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProcessedRequest {
    pub processed: bool,
}

/// Anything other than "partnership" goes to general support.
fn contact_kind(raw: Option<&str>) -> ContactKind {
    raw.and_then(|s| ContactKind::parse(s).ok())
        .unwrap_or_default()
}

/// Send the team notification and the submitter's confirmation.
///
/// Returns whether both went out; failures are logged, never surfaced.
pub async fn notify(
    mailer: &dyn Mailer,
    routing: &ContactRouting,
    msg: &NewContactMessage<'_>,
) -> bool {
    let mut delivered = true;
    for email in [contact_notification(msg, routing), contact_confirmation(msg, routing)] {
        if let Err(e) = mailer.send(&email).await {
            tracing::warn!(to = %email.to, transport = mailer.transport(), error = %e, "contact email not delivered");
            delivered = false;
        }
    }
    delivered
}

/// POST /api/contact
async fn submit(
    State(state): State<Arc<AppState>>,
    JsonOrForm { data: req, via_form }: JsonOrForm<ContactRequest>,
) -> Result<Response, ApiError> {
    let (Some(name), Some(email), Some(message)) = (
        req.name.as_deref().filter(|s| !s.trim().is_empty()),
        req.email.as_deref().filter(|s| !s.trim().is_empty()),
        req.message.as_deref().filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(ApiError::bad_request("Name, email, and message are required"));
    };

    let name = PersonName::new(name)?;
    let email = Email::new(email)?;
    let message = required_text("message", Some(message), MAX_MESSAGE_LEN)?;
    let subject = optional_text("subject", req.subject.as_deref(), MAX_SUBJECT_LEN)?;
    let msg = NewContactMessage {
        name: name.as_str(),
        email: email.as_str(),
        subject: subject.as_deref(),
        message: &message,
        kind: contact_kind(req.kind.as_deref()),
    };

    match ContactRepo::new(&state.pool).create(&msg).await {
        Ok(saved) => tracing::info!(contact_id = %saved.id, kind = %msg.kind, "contact message stored"),
        Err(e) => tracing::warn!(error = %e, "contact message not stored"),
    }

    let delivered = notify(state.mailer.as_ref(), &state.config.contact_routing(), &msg).await;
    let body = ContactReply {
        success: true,
        message: if delivered {
            "Message sent successfully!"
        } else {
            "Message received"
        },
    };
    Ok(reply(via_form, "/contact", StatusCode::OK, body))
}

/// GET /api/admin/contact - unprocessed first
async fn admin_list(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<ContactMessageResponse>>, ApiError> {
    let messages = ContactRepo::new(&state.pool).list().await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// PATCH /api/admin/contact/{id}
async fn admin_mark(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<ProcessedRequest>,
) -> Result<StatusCode, ApiError> {
    ContactRepo::new(&state.pool)
        .set_processed(id, req.processed)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Contact routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/contact", post(submit))
        .route("/api/admin/contact", get(admin_list))
        .route("/api/admin/contact/{id}", patch(admin_mark))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::MemoryMailer;

    fn message() -> NewContactMessage<'static> {
        NewContactMessage {
            name: "Jordan Lee",
            email: "jordan@example.com",
            subject: None,
            message: "Do you run workshops for clubs?",
            kind: ContactKind::Partnership,
        }
    }

    #[tokio::test]
    async fn sends_notification_and_confirmation() {
        let mailer = MemoryMailer::new();
        let routing = ContactRouting::default();

        assert!(notify(&mailer, &routing, &message()).await);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "partners@thementallap.com");
        assert_eq!(sent[0].reply_to.as_deref(), Some("jordan@example.com"));
        assert_eq!(sent[1].to, "jordan@example.com");
    }

    #[tokio::test]
    async fn delivery_failure_is_not_an_error() {
        let mailer = MemoryMailer::failing();
        assert!(!notify(&mailer, &ContactRouting::default(), &message()).await);
        assert!(mailer.sent().is_empty());
    }

    #[test]
    fn kind_defaults_to_general() {
        assert_eq!(contact_kind(Some("partnership")), ContactKind::Partnership);
        assert_eq!(contact_kind(Some("press")), ContactKind::General);
        assert_eq!(contact_kind(Some("")), ContactKind::General);
        assert_eq!(contact_kind(None), ContactKind::General);
    }
}
