//! Articles: public library and recruiting tips, admin authoring

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::{content_overview, ContentOverview};
use crate::db::{Article, ArticleRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, ValidUuid};
use crate::http::form::{checkbox, ApiJson};
use crate::http::server::AppState;
use crate::models::{ArticleDraft, ArticleSection};

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub id: Uuid,
    pub section: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Article> for ArticleResponse {
    fn from(a: Article) -> Self {
        Self {
            id: a.id,
            section: a.section,
            title: a.title,
            slug: a.slug,
            excerpt: a.excerpt,
            content: a.content,
            author_id: a.author_id,
            author_name: a.author_name,
            published_at: a.published_at,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SectionParams {
    pub section: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleRequest {
    pub section: Option<String>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub publish: bool,
}

impl ArticleRequest {
    fn to_draft(&self) -> Result<ArticleDraft, ApiError> {
        Ok(ArticleDraft::new(
            self.section.as_deref(),
            self.title.as_deref(),
            self.excerpt.as_deref(),
            self.content.as_deref(),
            self.publish,
        )?)
    }
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}

/// GET /api/articles?section=library - published only, newest first
async fn list_published(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SectionParams>,
) -> Result<Json<Vec<ArticleResponse>>, ApiError> {
    let section = match params.section.as_deref() {
        Some(raw) => ArticleSection::parse(raw)?,
        None => ArticleSection::Library,
    };
    let articles = ArticleRepo::new(&state.pool).list_published(section).await?;
    Ok(Json(articles.into_iter().map(Into::into).collect()))
}

/// GET /api/articles/{slug} - drafts are 404
async fn get_published(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = ArticleRepo::new(&state.pool)
        .get_published_by_slug(&slug)
        .await?;
    Ok(Json(article.into()))
}

/// GET /api/admin/articles - drafts included
async fn admin_list(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<ArticleResponse>>, ApiError> {
    let articles = ArticleRepo::new(&state.pool).list_all().await?;
    Ok(Json(articles.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/articles
async fn admin_create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<ArticleRequest>,
) -> Result<(StatusCode, Json<ArticleResponse>), ApiError> {
    let draft = req.to_draft()?;
    let article = ArticleRepo::new(&state.pool).create(admin.id, &draft).await?;
    tracing::info!(article_id = %article.id, slug = %article.slug, published = article.is_published(), "article created");
    Ok((StatusCode::CREATED, Json(article.into())))
}

/// GET /api/admin/articles/{id}
async fn admin_get(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidUuid(id): ValidUuid,
) -> Result<Json<ArticleResponse>, ApiError> {
    Ok(Json(ArticleRepo::new(&state.pool).get(id).await?.into()))
}

/// PUT /api/admin/articles/{id}
async fn admin_update(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<ArticleRequest>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let draft = req.to_draft()?;
    let article = ArticleRepo::new(&state.pool).update(id, &draft).await?;
    Ok(Json(article.into()))
}

/// POST /api/admin/articles/{id}/publish
async fn admin_publish(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<PublishRequest>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = ArticleRepo::new(&state.pool)
        .set_published(id, req.published)
        .await?;
    Ok(Json(article.into()))
}

/// DELETE /api/admin/articles/{id}
async fn admin_delete(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidUuid(id): ValidUuid,
) -> Result<StatusCode, ApiError> {
    ArticleRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct ContentAdminResponse {
    pub overview: ContentOverview,
    pub articles: Vec<ArticleResponse>,
}

/// GET /api/admin/content
async fn admin_content(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<ContentAdminResponse>, ApiError> {
    let articles = ArticleRepo::new(&state.pool).list_all().await?;
    let overview = content_overview(&articles, Utc::now());
    Ok(Json(ContentAdminResponse {
        overview,
        articles: articles.into_iter().map(Into::into).collect(),
    }))
}

/// Article routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/articles", get(list_published))
        .route("/api/articles/{slug}", get(get_published))
        .route("/api/admin/articles", get(admin_list).post(admin_create))
        .route(
            "/api/admin/articles/{id}",
            get(admin_get).put(admin_update).delete(admin_delete),
        )
        .route("/api/admin/articles/{id}/publish", post(admin_publish))
        .route("/api/admin/content", get(admin_content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_from_request() {
        let req: ArticleRequest = serde_json::from_str(
            r#"{"section": "recruiting", "title": "Emailing College Coaches",
                "excerpt": "What to send", "content": "Keep it short.", "publish": true}"#,
        )
        .unwrap();
        let draft = req.to_draft().unwrap();
        assert_eq!(draft.section, ArticleSection::Recruiting);
        assert!(draft.publish);
        assert_eq!(draft.base_slug().unwrap().as_str(), "emailing-college-coaches");
    }

    #[test]
    fn unknown_section_is_rejected() {
        let req: ArticleRequest = serde_json::from_str(
            r#"{"section": "news", "title": "T", "excerpt": "E", "content": "C"}"#,
        )
        .unwrap();
        assert!(matches!(req.to_draft().unwrap_err(), ApiError::Validation(_)));
    }
}
