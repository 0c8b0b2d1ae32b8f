//! Client dashboard at `/dashboard`.
//!
//! Requires a resolved session. Visitors without one are sent to `/auth`
//! with `next` pointing back here.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Router};

use super::page::{self, escape_html};
use crate::middleware::CurrentSession;
use crate::state::AppState;

const DASHBOARD_PATH: &str = "/dashboard";

/// Build the dashboard router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(DASHBOARD_PATH, get(dashboard))
}

/// Sign-in URL that returns the visitor to `path` afterwards.
#[must_use]
pub fn sign_in_redirect(path: &str) -> String {
    format!("/auth?next={}", urlencoding::encode(path))
}

/// One job shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub address: &'static str,
    pub kind: &'static str,
}

/// Next scheduled site visit.
pub const NEXT_VISIT: &str = "8AM Tuesday";

/// Ongoing jobs. There is no project store behind these yet.
pub const ONGOING_JOBS: &[Job] = &[
    Job {
        address: "42 Riverside Drive",
        kind: "Extension",
    },
    Job {
        address: "19 High Street",
        kind: "Chimney Stack",
    },
];

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
) -> Response {
    let Some(session) = current.session else {
        return Redirect::to(&sign_in_redirect(DASHBOARD_PATH)).into_response();
    };

    let mut jobs = String::new();
    for job in ONGOING_JOBS {
        let _ = write!(
            jobs,
            r#"<li class="card"><h3>{address}</h3><p>{kind}</p></li>"#,
            address = escape_html(job.address),
            kind = escape_html(job.kind),
        );
    }

    let body = DASHBOARD_BODY
        .replace("{{NAME}}", &escape_html(&session.user.display_name()))
        .replace("{{NEXT_VISIT}}", NEXT_VISIT)
        .replace("{{JOBS}}", &jobs);

    Html(page::layout(&state.config.business_name, "My Projects", &body)).into_response()
}

const DASHBOARD_BODY: &str = r#"<div class="page-heading"><div><h1>My Projects</h1><p class="kicker">Welcome back, {{NAME}}</p></div></div>
<div class="card"><p class="kicker">Next Site Visit</p><h3>{{NEXT_VISIT}}</h3></div>
<h2 style="margin-top:28px">Ongoing Jobs</h2>
<ul class="jobs" style="list-style:none;padding:0">{{JOBS}}</ul>
<div class="cta-grid" style="display:grid;grid-template-columns:1fr 1fr;gap:12px;margin-top:20px">
  <a class="btn btn-primary" href="/quote-selection">New Quote</a>
  <a class="btn" href="tel:+447700900000">Need Changes?</a>
</div>
<form method="post" action="/auth/sign-out" data-submit-once style="margin-top:28px">
  <button type="submit" class="btn btn-block">SIGN OUT</button>
</form>"#;
