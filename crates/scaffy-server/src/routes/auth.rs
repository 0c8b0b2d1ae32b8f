//! Authentication routes: `/auth` and `/auth/sign-out`.
//!
//! Sign-in validates the form locally first, then hands the credentials to
//! the session provider through an [`AsyncAction`]. Rejected credentials get
//! a fixed "Login failed" notice; anything else goes through
//! [`handle_error`].

use std::sync::Arc;

use axum::extract::{Form as FormBody, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Extension, Router};
use serde::Deserialize;
use tower::limit::ConcurrencyLimitLayer;

use scaffy_core::action::{ActionOptions, AsyncAction};
use scaffy_core::auth::SignedIn;
use scaffy_core::error::{ErrorKind, handle_error};
use scaffy_core::form::{ErrorMap, Form};
use scaffy_core::notice::{Notice, NoticeBuffer, Notifier};
use scaffy_core::validation::{validate_email, validate_length};

use super::page::{self, Field};
use crate::error::PageError;
use crate::middleware::{CurrentSession, clear_session_cookie, session_cookie};
use crate::state::AppState;

/// Where a signed-in visitor lands by default.
pub const DEFAULT_AFTER_SIGN_IN: &str = "/dashboard";

const EMAIL: &str = "email";
const PASSWORD: &str = "password";
const MIN_PASSWORD_CHARS: usize = 6;
const MAX_CONCURRENT_SIGN_INS: usize = 10;

/// Build the `/auth` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth", get(sign_in_page).post(sign_in))
        .route("/auth/sign-out", post(sign_out))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_SIGN_INS))
}

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    pub next: String,
}

/// `next` if it is a same-site absolute path, else the dashboard.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => DEFAULT_AFTER_SIGN_IN,
    }
}

/// Validate the sign-in form.
///
/// # Errors
///
/// Returns the [`ErrorMap`] of every invalid field.
pub fn validate_sign_in(email: &str, password: &str) -> Result<(), ErrorMap> {
    let mut errors = ErrorMap::new();
    if !validate_email(email.trim()) {
        errors.insert_if_absent(EMAIL, "Invalid email address");
    }
    if validate_length(password, "Password", Some(MIN_PASSWORD_CHARS), None).is_err() {
        errors.insert_if_absent(PASSWORD, "Password must be at least 6 characters");
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn sign_in_page(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Query(query): Query<NextQuery>,
) -> Response {
    if current.is_signed_in() {
        return Redirect::to(DEFAULT_AFTER_SIGN_IN).into_response();
    }
    let next = safe_next(query.next.as_deref());
    Html(render_sign_in(&state, &Form::new(&[EMAIL, PASSWORD]), next, &[])).into_response()
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    FormBody(input): FormBody<SignInForm>,
) -> Response {
    let next = safe_next(Some(input.next.as_str())).to_owned();
    let mut form = Form::new(&[EMAIL, PASSWORD]);
    form.values.set(EMAIL, input.email.trim());

    if let Err(errors) = validate_sign_in(&input.email, &input.password) {
        form.accept(errors);
        let html = render_sign_in(&state, &form, &next, &[]);
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response();
    }

    let notices = NoticeBuffer::new();
    let action: AsyncAction<SignedIn> =
        AsyncAction::new(Arc::new(notices.clone()), ActionOptions::default().quiet_errors());
    let signed_in = action
        .execute(|| {
            state
                .sessions
                .sign_in_with_password(input.email.trim(), &input.password)
        })
        .await;

    if let Some(signed_in) = signed_in {
        let Some(cookie) = session_cookie(&state.config, &signed_in.token) else {
            return PageError::Internal("session token is not a valid cookie value".to_owned())
                .into_response();
        };
        tracing::info!(user_id = %signed_in.session.user.id, next = %next, "signed in");
        return ([(header::SET_COOKIE, cookie)], Redirect::to(&next)).into_response();
    }

    if let Some(error) = action.error().await {
        if error.kind() == ErrorKind::Auth {
            notices.notify(Notice::destructive(
                "Login failed",
                "Invalid email or password. Please try again.",
            ));
        } else {
            handle_error(&notices, error, true);
        }
    }

    let html = render_sign_in(&state, &form, &next, &notices.drain());
    (StatusCode::UNAUTHORIZED, Html(html)).into_response()
}

async fn sign_out(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
) -> Response {
    if let Some(token) = &current.token {
        state.sessions.sign_out(token).await;
    }
    (
        [(header::SET_COOKIE, clear_session_cookie(&state.config))],
        Redirect::to("/"),
    )
        .into_response()
}

fn render_sign_in(state: &AppState, form: &Form, next: &str, notices: &[Notice]) -> String {
    let content = format!(
        r#"{heading}<h2>WELCOME BACK</h2><p class="kicker">Log in to manage your projects</p>{notices}
<form method="post" action="/auth" novalidate data-submit-once style="margin-top:24px">
{next}{email}{password}
<button type="submit" class="btn btn-primary btn-block">LOG IN</button>
</form>"#,
        heading = page::heading("LOG IN", "Client Area", "/"),
        notices = page::notices(notices),
        next = page::hidden("next", next),
        email = page::input(
            Field {
                name: EMAIL,
                label: "Email Address",
                kind: "email",
                placeholder: "you@example.com",
            },
            form.value(EMAIL),
            form.error(EMAIL),
        ),
        password = page::input(
            Field {
                name: PASSWORD,
                label: "Password",
                kind: "password",
                placeholder: "••••••••",
            },
            "",
            form.error(PASSWORD),
        ),
    );
    page::layout(&state.config.business_name, "Log In", &content)
}
