//! Router-level acceptance tests
//!
//! The first group runs against a lazily connected pool and never touches
//! the database. The `#[ignore]`d group needs a migrated Postgres:
//! `DATABASE_URL=postgres://... cargo test -p mentallap-server -- --ignored`

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use mentallap_server::mail::{Mailer, MemoryMailer};
use mentallap_server::{build_router, AppConfig, AppState};

fn offline_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy("postgres://mentallap@127.0.0.1:1/mentallap")
        .unwrap()
}

fn app_with(pool: PgPool, mailer: Arc<dyn Mailer>) -> Router {
    build_router(Arc::new(AppState::new(pool, mailer, AppConfig::default())))
}

fn offline_app() -> Router {
    app_with(offline_pool(), Arc::new(MemoryMailer::new()))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    req.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn send(method: &str, uri: &str, cookie: &str, body: Option<Value>) -> Request<Body> {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie);
    match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    }
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn api_requires_sign_in() {
    for uri in ["/api/journal", "/api/bookings", "/api/analyses", "/api/auth/me", "/api/registrations"] {
        let response = offline_app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(json_body(response).await["error"], "unauthorized");
    }
}

#[tokio::test]
async fn admin_api_requires_sign_in() {
    for uri in [
        "/api/admin/stats",
        "/api/admin/analytics",
        "/api/admin/athletes",
        "/api/admin/workshops",
        "/api/admin/workshop-registrations",
    ] {
        let response = offline_app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn member_pages_redirect_to_sign_in() {
    for uri in ["/dashboard", "/journal", "/form-analysis", "/admin/analytics", "/admin/workshops"] {
        let response = offline_app().oneshot(get(uri)).await.unwrap();
        assert!(response.status().is_redirection(), "{uri}");
        assert_eq!(location(&response), "/auth/signin", "{uri}");
    }
}

#[tokio::test]
async fn public_pages_render_without_a_session() {
    for uri in ["/", "/contact", "/auth/signin", "/auth/signup"] {
        let response = offline_app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"), "{uri}");
    }
}

#[tokio::test]
async fn contact_requires_name_email_and_message() {
    let response = offline_app()
        .oneshot(post_json(
            "/api/contact",
            serde_json::json!({"name": "Jordan", "email": "", "message": "Hi"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["message"],
        "Name, email, and message are required"
    );
}

#[tokio::test]
async fn contact_succeeds_when_delivery_fails() {
    let app = app_with(offline_pool(), Arc::new(MemoryMailer::failing()));
    let response = app
        .oneshot(post_json(
            "/api/contact",
            serde_json::json!({
                "name": "Jordan Lee",
                "email": "jordan@example.com",
                "message": "Do you run team workshops?",
                "type": "partnership"
            }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Message received");
}

#[tokio::test]
async fn mistyped_json_is_a_400_json_error() {
    let response = offline_app()
        .oneshot(post_json(
            "/api/auth/signup",
            serde_json::json!({"email": 5, "password": "password123", "name": "Test"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "bad_request");
}

#[tokio::test]
async fn unparseable_json_is_a_400_json_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/signin")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let response = offline_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "bad_request");
}

#[tokio::test]
async fn json_body_without_content_type_is_a_400_json_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/signin")
        .body(Body::from(r#"{"email":"a@example.com","password":"password123"}"#))
        .unwrap();
    let response = offline_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().unwrap().contains("Content-Type"));
}

#[tokio::test]
async fn malformed_ids_are_rejected() {
    let response = offline_app()
        .oneshot(get("/api/workshops/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_unreachable_database() {
    let response = offline_app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "unavailable");
}

#[tokio::test]
async fn unknown_routes_are_404() {
    let response = offline_app().oneshot(get("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---- database-backed ----

async fn database() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = mentallap_server::create_pool(&url).await.unwrap();
    mentallap_server::migrate(&pool).await.unwrap();
    pool
}

fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

/// Sign up through the API and return the session cookie pair and user id.
async fn sign_up_as(app: &Router, email: &str, role: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/signup",
            serde_json::json!({
                "email": email,
                "password": "password123",
                "name": "Test Member",
                "role": role
            }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    let cookie = set_cookie.split(';').next().unwrap().to_owned();
    let body = json_body(response).await;
    (cookie, body["user"]["id"].as_str().unwrap().to_owned())
}

async fn sign_up(app: &Router, email: &str) -> String {
    sign_up_as(app, email, "athlete").await.0
}

/// A signed-in admin: signs up, then promotes the account directly.
async fn admin_session(app: &Router, pool: &PgPool) -> String {
    let email = unique_email("admin");
    let cookie = sign_up(app, &email).await;
    mentallap_server::seed::set_role(pool, &email, "admin")
        .await
        .unwrap();
    cookie
}

#[tokio::test]
#[ignore = "requires database"]
async fn sign_up_creates_a_usable_session() {
    let app = app_with(database().await, Arc::new(MemoryMailer::new()));
    let email = unique_email("signup");
    let cookie = sign_up(&app, &email).await;

    let me = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::OK);
    let body = json_body(me).await;
    assert_eq!(body["email"], email.as_str());
    assert_eq!(body["role"], "athlete");

    let wrong = app
        .clone()
        .oneshot(post_json(
            "/api/auth/signin",
            serde_json::json!({"email": email, "password": "not-the-password"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn athletes_cannot_use_admin_api() {
    let app = app_with(database().await, Arc::new(MemoryMailer::new()));
    let cookie = sign_up(&app, &unique_email("athlete")).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/stats")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let page = app
        .oneshot(
            Request::builder()
                .uri("/admin/analytics")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(page.status().is_redirection());
    assert_eq!(location(&page), "/dashboard");
}

#[tokio::test]
#[ignore = "requires database"]
async fn registration_rejects_duplicates_and_full_workshops() {
    let pool = database().await;
    let app = app_with(pool.clone(), Arc::new(MemoryMailer::new()));
    let admin = admin_session(&app, &pool).await;

    let created = app
        .clone()
        .oneshot(send(
            "POST",
            "/api/admin/workshops",
            &admin,
            Some(serde_json::json!({
                "title": format!("Single Seat {}", Uuid::new_v4().simple()),
                "summary": "One athlete only",
                "starts_at": "2030-06-01T17:00:00Z",
                "duration_min": 60,
                "capacity": 1,
                "location": "Online via Zoom"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let workshop_id = json_body(created).await["workshop"]["id"]
        .as_str()
        .unwrap()
        .to_owned();
    let register_uri = format!("/api/workshops/{workshop_id}/register");

    let first = sign_up(&app, &unique_email("first")).await;
    let response = app
        .clone()
        .oneshot(send("POST", &register_uri, &first, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["message"],
        "Successfully registered for workshop"
    );

    let again = app
        .clone()
        .oneshot(send("POST", &register_uri, &first, None))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(again).await["message"],
        "Already registered for this workshop"
    );

    let second = sign_up(&app, &unique_email("second")).await;
    let full = app
        .clone()
        .oneshot(send("POST", &register_uri, &second, None))
        .await
        .unwrap();
    assert_eq!(full.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(full).await["message"], "Workshop is full");

    let unknown = app
        .oneshot(send(
            "POST",
            &format!("/api/workshops/{}/register", Uuid::new_v4()),
            &second,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn rejected_booking_update_changes_nothing() {
    let app = app_with(database().await, Arc::new(MemoryMailer::new()));
    let (coach, coach_id) = sign_up_as(&app, &unique_email("coach"), "coach").await;
    let athlete = sign_up(&app, &unique_email("athlete")).await;

    let created = app
        .clone()
        .oneshot(send(
            "POST",
            "/api/bookings",
            &athlete,
            Some(serde_json::json!({"coach_id": coach_id, "session_type": "mental"})),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let booking_id = json_body(created).await["id"].as_str().unwrap().to_owned();
    let booking_uri = format!("/api/bookings/{booking_id}");

    let rejected = app
        .clone()
        .oneshot(send(
            "PATCH",
            &booking_uri,
            &coach,
            Some(serde_json::json!({"status": "confirmed", "external_link": "x".repeat(600)})),
        ))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let current = app
        .clone()
        .oneshot(send("GET", &booking_uri, &coach, None))
        .await
        .unwrap();
    assert_eq!(json_body(current).await["status"], "requested");

    let accepted = app
        .oneshot(send(
            "PATCH",
            &booking_uri,
            &coach,
            Some(serde_json::json!({
                "status": "confirmed",
                "external_link": "https://meet.example.com/lap"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::OK);
    let body = json_body(accepted).await;
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["external_link"], "https://meet.example.com/lap");
}

#[tokio::test]
#[ignore = "requires database"]
async fn journal_total_survives_paging_past_the_end() {
    let app = app_with(database().await, Arc::new(MemoryMailer::new()));
    let athlete = sign_up(&app, &unique_email("journal")).await;

    for (date, mood) in [("2024-03-01", 3), ("2024-03-02", 4), ("2024-03-03", 5)] {
        let response = app
            .clone()
            .oneshot(send(
                "POST",
                "/api/journal",
                &athlete,
                Some(serde_json::json!({"date": date, "mood": mood, "sleep_hours": 8, "rpe": 6})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let page = app
        .oneshot(send("GET", "/api/journal?page=5&per_page=2", &athlete, None))
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let body = json_body(page).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 5);
}
