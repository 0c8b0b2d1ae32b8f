//! HTTP routes for the Scaffy site.
//!
//! Every page lives in its own module exposing `router()`. [`build_router`]
//! merges them, mounts static assets and applies the shared layers.

pub mod auth;
pub mod dashboard;
pub mod page;
pub mod quote;
pub mod ui;

use std::any::Any;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::middleware as axum_mw;
use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::error::PageError;
use crate::middleware::session_middleware;
use crate::state::AppState;

/// Build the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let pages = Router::new()
        .merge(ui::router())
        .merge(quote::router())
        .merge(auth::router())
        .merge(dashboard::router());
    with_layers(pages, state)
}

/// Mount assets and the 404 fallback, then wrap `pages` in the shared layers.
fn with_layers(pages: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    pages
        .nest_service("/assets", ServeDir::new(&state.config.assets_dir))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum_mw::from_fn_with_state(
            Arc::clone(&state),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}

async fn not_found() -> PageError {
    PageError::NotFound
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = %detail, "handler panicked");
    PageError::Internal(detail.to_owned()).into_response()
}
