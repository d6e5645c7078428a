//! Server-rendered HTML pages

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
    Router,
};
use chrono::Utc;

use crate::analytics::{
    admin_stats, analysis_overview, analytics_report, athlete_summary, booking_overview,
    content_overview, journal_summary, month_start, week_ago,
};
use crate::db::{
    AnalysisRepo, Article, ArticleRepo, BookingRepo, JournalRepo, RegistrationRepo, StatsRepo,
    User, UserRepo, WorkshopRepo, SUMMARY_WINDOW,
};
use crate::http::error::ApiError;
use crate::http::extractors::{MaybeUser, PageAdmin, PageUser};
use crate::http::server::AppState;
use crate::models::{ArticleSection, Role};
use crate::views;

type Page = Result<Html<String>, ApiError>;

/// Entries listed on the journal page
const JOURNAL_PAGE_ENTRIES: usize = 30;

async fn home(MaybeUser(user): MaybeUser) -> Html<String> {
    Html(views::home(user.as_ref()))
}

async fn workshops(State(state): State<Arc<AppState>>, MaybeUser(user): MaybeUser) -> Page {
    let now = Utc::now();
    let (upcoming, past): (Vec<_>, Vec<_>) = WorkshopRepo::new(&state.pool)
        .list_with_counts()
        .await?
        .into_iter()
        .partition(|w| w.workshop.starts_at >= now);
    Ok(Html(views::workshops(user.as_ref(), &upcoming, &past)))
}

async fn section_index(state: &AppState, user: Option<&User>, section: ArticleSection) -> Page {
    let items = ArticleRepo::new(&state.pool).list_published(section).await?;
    Ok(Html(views::articles(user, section, &items)))
}

/// Published article that belongs to `section`; anything else is 404.
async fn section_article(state: &AppState, section: ArticleSection, slug: &str) -> Result<Article, ApiError> {
    let article = ArticleRepo::new(&state.pool).get_published_by_slug(slug).await?;
    if article.section != section.as_str() {
        return Err(ApiError::NotFound {
            resource: "article",
            id: slug.to_owned(),
        });
    }
    Ok(article)
}

async fn library(State(state): State<Arc<AppState>>, MaybeUser(user): MaybeUser) -> Page {
    section_index(&state, user.as_ref(), ArticleSection::Library).await
}

async fn library_article(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(slug): Path<String>,
) -> Page {
    let article = section_article(&state, ArticleSection::Library, &slug).await?;
    Ok(Html(views::article(user.as_ref(), &article)))
}

async fn recruiting(State(state): State<Arc<AppState>>, MaybeUser(user): MaybeUser) -> Page {
    section_index(&state, user.as_ref(), ArticleSection::Recruiting).await
}

async fn recruiting_article(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(slug): Path<String>,
) -> Page {
    let article = section_article(&state, ArticleSection::Recruiting, &slug).await?;
    Ok(Html(views::article(user.as_ref(), &article)))
}

async fn sessions(State(state): State<Arc<AppState>>, MaybeUser(user): MaybeUser) -> Page {
    let coaches = UserRepo::new(&state.pool).list_by_role(Role::Coach).await?;
    Ok(Html(views::sessions(
        user.as_ref(),
        &coaches,
        state.config.site.calendly_url.as_deref(),
    )))
}

async fn contact(MaybeUser(user): MaybeUser) -> Html<String> {
    Html(views::contact(user.as_ref()))
}

/// Role-specific landing page after sign-in
async fn dashboard(State(state): State<Arc<AppState>>, PageUser(user): PageUser) -> Page {
    let now = Utc::now();
    match user.role() {
        Role::Admin => {
            let stats = StatsRepo::new(&state.pool);
            let counts = stats.dashboard(now, week_ago(now)).await?;
            let revenue = stats.workshop_revenue().await?;
            Ok(Html(views::admin_dashboard(
                &user,
                &admin_stats(&counts, &revenue, now),
            )))
        }
        Role::Coach => {
            let bookings = BookingRepo::new(&state.pool).list_for_coach(user.id).await?;
            let queue: Vec<_> = AnalysisRepo::new(&state.pool)
                .list_all()
                .await?
                .into_iter()
                .filter(|a| a.status().is_ok_and(|s| s.is_pending()))
                .collect();
            Ok(Html(views::coach_dashboard(&user, &bookings, &queue)))
        }
        Role::Athlete => {
            let journal = JournalRepo::new(&state.pool);
            let entries = journal.recent(user.id, SUMMARY_WINDOW).await?;
            let total = journal.count(user.id).await?;
            let summary = journal_summary(&entries, total, now.date_naive());
            let registrations = RegistrationRepo::new(&state.pool).list_for_user(user.id).await?;
            let bookings = BookingRepo::new(&state.pool).list_for_athlete(user.id).await?;
            let analyses = AnalysisRepo::new(&state.pool).list_for_athlete(user.id).await?;
            Ok(Html(views::athlete_dashboard(
                &user,
                &summary,
                &registrations,
                &bookings,
                &analyses,
            )))
        }
    }
}

async fn journal(State(state): State<Arc<AppState>>, PageUser(user): PageUser) -> Page {
    let repo = JournalRepo::new(&state.pool);
    let entries = repo.recent(user.id, SUMMARY_WINDOW).await?;
    let total = repo.count(user.id).await?;
    let summary = journal_summary(&entries, total, Utc::now().date_naive());
    let shown = &entries[..entries.len().min(JOURNAL_PAGE_ENTRIES)];
    Ok(Html(views::journal(&user, shown, &summary)))
}

async fn form_analysis(State(state): State<Arc<AppState>>, PageUser(user): PageUser) -> Page {
    let analyses = AnalysisRepo::new(&state.pool).list_for_athlete(user.id).await?;
    Ok(Html(views::form_analysis(&user, &analyses)))
}

async fn admin_analytics(State(state): State<Arc<AppState>>, PageAdmin(user): PageAdmin) -> Page {
    let now = Utc::now();
    let stats = StatsRepo::new(&state.pool);
    let counts = stats.analytics(now, week_ago(now), month_start(now)).await?;
    let revenue = stats.workshop_revenue().await?;
    let report = analytics_report(&counts, &revenue, now);
    Ok(Html(views::admin_analytics(&user, &report)))
}

async fn admin_athletes(State(state): State<Arc<AppState>>, PageAdmin(user): PageAdmin) -> Page {
    let now = Utc::now();
    let athletes = StatsRepo::new(&state.pool).athletes().await?;
    let summary = athlete_summary(&athletes, now);
    Ok(Html(views::admin_athletes(&user, &athletes, &summary, now)))
}

async fn admin_bookings(State(state): State<Arc<AppState>>, PageAdmin(user): PageAdmin) -> Page {
    let bookings = BookingRepo::new(&state.pool).list_all().await?;
    let overview = booking_overview(&bookings, Utc::now());
    Ok(Html(views::admin_bookings(&user, &bookings, &overview)))
}

async fn admin_content(State(state): State<Arc<AppState>>, PageAdmin(user): PageAdmin) -> Page {
    let articles = ArticleRepo::new(&state.pool).list_all().await?;
    let overview = content_overview(&articles, Utc::now());
    Ok(Html(views::admin_content(&user, &articles, &overview)))
}

async fn admin_form_analysis(
    State(state): State<Arc<AppState>>,
    PageAdmin(user): PageAdmin,
) -> Page {
    let analyses = AnalysisRepo::new(&state.pool).list_all().await?;
    let overview = analysis_overview(&analyses, Utc::now().date_naive());
    Ok(Html(views::admin_form_analysis(&user, &analyses, &overview)))
}

async fn admin_workshops(State(state): State<Arc<AppState>>, PageAdmin(user): PageAdmin) -> Page {
    let workshops = WorkshopRepo::new(&state.pool).list_with_registrants().await?;
    Ok(Html(views::admin_workshops(&user, &workshops)))
}

/// Page routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/workshops", get(workshops))
        .route("/library", get(library))
        .route("/library/{slug}", get(library_article))
        .route("/recruiting-tips", get(recruiting))
        .route("/recruiting-tips/{slug}", get(recruiting_article))
        .route("/sessions", get(sessions))
        .route("/contact", get(contact))
        .route("/dashboard", get(dashboard))
        .route("/journal", get(journal))
        .route("/form-analysis", get(form_analysis))
        .route("/admin/analytics", get(admin_analytics))
        .route("/admin/athletes", get(admin_athletes))
        .route("/admin/bookings", get(admin_bookings))
        .route("/admin/content", get(admin_content))
        .route("/admin/form-analysis", get(admin_form_analysis))
        .route("/admin/workshops", get(admin_workshops))
}
