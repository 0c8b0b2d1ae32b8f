//! Router-level tests for the Scaffy site.
//!
//! Each test builds the full router over an in-memory session provider and
//! the logging lead sink, then drives it with `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use tower::ServiceExt;

use scaffy_core::auth::MemorySessionProvider;
use scaffy_core::leads::LoggingLeadSink;
use scaffy_server::config::SiteConfig;
use scaffy_server::routes::build_router;
use scaffy_server::state::AppState;

const EMAIL: &str = "joe@example.com";
const PASSWORD: &str = "hunter22";

fn app() -> Router {
    let sessions = MemorySessionProvider::new(chrono::Duration::hours(1)).with_user(EMAIL, PASSWORD);
    let state = AppState::new(
        SiteConfig::default(),
        Arc::new(sessions),
        Arc::new(LoggingLeadSink),
    );
    build_router(Arc::new(state))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Sign in and return the `name=value` pair of the session cookie.
async fn sign_in(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_form(
            "/auth",
            "email=joe%40example.com&password=hunter22&next=%2Fdashboard",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .unwrap();
    assert!(cookie.contains("HttpOnly"));
    cookie.split(';').next().unwrap().to_owned()
}

// ── Landing & chrome ─────────────────────────────────────────────────

#[tokio::test]
async fn landing_page_carries_hero_settings() {
    let response = app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"data-mode="once""#));
    assert!(html.contains(r#"data-fallback-ms="100""#));
    assert!(html.contains("hero-animation.mp4"));
    assert!(html.contains("GET A QUOTE"));
    assert!(html.contains(r#"href="/quote-selection""#));
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let response = app().oneshot(get("/")).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
}

#[tokio::test]
async fn unknown_path_renders_not_found_page() {
    let response = app().oneshot(get("/no-such-page")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("Page Not Found"));
    assert!(html.contains("Go Back"));
    assert!(html.contains("Home"));
}

#[tokio::test]
async fn quote_selection_links_both_forms() {
    let html = body_text(app().oneshot(get("/quote-selection")).await.unwrap()).await;
    assert!(html.contains(r#"href="/quick-estimate""#));
    assert!(html.contains(r#"href="/accurate-quote""#));
}

// ── Quick estimate ───────────────────────────────────────────────────

#[tokio::test]
async fn invalid_quick_estimate_shows_every_error() {
    let response = app()
        .oneshot(post_form(
            "/quick-estimate",
            "name=&phone=123&job_type=&description=",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Name is required"));
    assert!(html.contains("Please enter a valid phone number"));
    assert!(html.contains("Description is required"));
    assert!(!html.contains("Estimate requested"));
}

#[tokio::test]
async fn valid_quick_estimate_is_acknowledged() {
    let response = app()
        .oneshot(post_form(
            "/quick-estimate",
            "name=Joe+Bloggs&phone=07700+900000&job_type=painting&description=Front+of+house%2C+2+lifts",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Estimate requested"));
    assert!(html.contains("Reference "));
    // Form is cleared after a successful submission.
    assert!(!html.contains(r#"value="Joe Bloggs""#));
}

// ── Accurate quote ───────────────────────────────────────────────────

#[tokio::test]
async fn saving_empty_section_reports_height_and_length() {
    let response = app()
        .oneshot(post_form(
            "/accurate-quote",
            "action=save_section&name=Joe&phone=07700+900000&sections=%5B%5D&section_name=Front&height=&length=&board_width=4",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Height is required"));
    assert!(html.contains("Length is required"));
    assert!(html.contains("0 parts added"));
    assert!(html.contains(r#"value="Joe""#));
}

#[tokio::test]
async fn saved_section_round_trips_through_the_form() {
    let response = app()
        .oneshot(post_form(
            "/accurate-quote",
            "action=save_section&name=Joe&phone=&sections=&section_name=Rear+Chimney&height=6&length=10&board_width=5",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("1 parts added"));
    assert!(html.contains("Rear Chimney"));
    assert!(html.contains(r#"name="sections""#));
}

#[tokio::test]
async fn submitting_without_sections_is_rejected() {
    let response = app()
        .oneshot(post_form(
            "/accurate-quote",
            "action=submit&name=Joe&phone=07700+900000&sections=%5B%5D",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Add at least one section"));
}

#[tokio::test]
async fn unreadable_section_list_is_a_page_error() {
    let response = app()
        .oneshot(post_form(
            "/accurate-quote",
            "action=submit&name=Joe&phone=07700+900000&sections=not-json",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Page Error"));
}

fn accurate_quote_body(action: &str, sections_json: &str, rest: &str) -> String {
    format!(
        "action={action}&name=Joe+Bloggs&phone=07700+900000&sections={}{rest}",
        urlencoding::encode(sections_json)
    )
}

#[tokio::test]
async fn forged_section_list_is_a_page_error() {
    let forged = r#"[{"id":1,"name":"","height":-5,"length":10,"board_width":"5"},{"id":1,"name":"Rear","height":2,"length":3,"board_width":"5"}]"#;
    let response = app()
        .oneshot(post_form(
            "/accurate-quote",
            &accurate_quote_body("submit", forged, ""),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("Page Error"));
    assert!(!html.contains("Quote requested"));
}

#[tokio::test]
async fn unknown_board_width_is_not_saved() {
    let response = app()
        .oneshot(post_form(
            "/accurate-quote",
            &accurate_quote_body(
                "save_section",
                "[]",
                "&section_name=Front&height=6&length=10&board_width=9",
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Please choose a board width"));
    assert!(html.contains("0 parts added"));
    assert!(!html.contains("5 Board</p>"));
}

#[tokio::test]
async fn valid_accurate_quote_is_acknowledged_and_cleared() {
    let sections = r#"[{"id":1700000000000,"name":"Rear Chimney","height":6.0,"length":10.0,"board_width":"4"}]"#;
    let response = app()
        .oneshot(post_form(
            "/accurate-quote",
            &accurate_quote_body("submit", sections, ""),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Quote requested"));
    assert!(html.contains("Reference "));
    assert!(html.contains("0 parts added"));
    assert!(!html.contains("Rear Chimney"));
    assert!(!html.contains(r#"value="Joe Bloggs""#));
}

#[tokio::test]
async fn cancelling_a_section_discards_the_draft() {
    let response = app()
        .oneshot(post_form(
            "/accurate-quote",
            &accurate_quote_body(
                "cancel_section",
                "[]",
                "&section_name=Half+typed&height=&length=&board_width=3",
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(!html.contains("Height is required"));
    assert!(!html.contains("SAVE SECTION"));
    assert!(!html.contains("Half typed"));
    assert!(html.contains(r#"value="open_section""#));
    assert!(html.contains(r#"value="Joe Bloggs""#));
}

#[tokio::test]
async fn quote_forms_guard_against_double_submit() {
    for uri in ["/quick-estimate", "/accurate-quote", "/auth"] {
        let html = body_text(app().oneshot(get(uri)).await.unwrap()).await;
        assert!(html.contains("data-submit-once"), "{uri}");
        assert!(html.contains("dataset.submitting"), "{uri}");
    }
}

// ── Auth & dashboard ─────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_requires_a_session() {
    let response = app().oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth?next=%2Fdashboard");
}

#[tokio::test]
async fn invalid_sign_in_form_is_not_sent() {
    let response = app()
        .oneshot(post_form("/auth", "email=nope&password=abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Invalid email address"));
    assert!(html.contains("Password must be at least 6 characters"));
}

#[tokio::test]
async fn wrong_password_shows_login_failed() {
    let response = app()
        .oneshot(post_form(
            "/auth",
            "email=joe%40example.com&password=wrong-password",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let html = body_text(response).await;
    assert!(html.contains("Login failed"));
    assert!(html.contains("Invalid email or password. Please try again."));
}

#[tokio::test]
async fn sign_in_opens_the_dashboard() {
    let app = app();
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Welcome back, Joe"));
    assert!(html.contains("42 Riverside Drive"));
    assert!(html.contains("19 High Street"));

    let response = app
        .oneshot(get_with_cookie("/auth", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn sign_out_ends_the_session() {
    let app = app();
    let cookie = sign_in(&app).await;

    let request = Request::builder()
        .method("POST")
        .uri("/auth/sign-out")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cleared = response.headers().get(header::SET_COOKIE).unwrap();
    assert!(cleared.to_str().unwrap().contains("Max-Age=0"));

    let response = app
        .oneshot(get_with_cookie("/dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn off_site_next_is_ignored() {
    let response = app()
        .oneshot(post_form(
            "/auth",
            "email=joe%40example.com&password=hunter22&next=%2F%2Fevil.example",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}
