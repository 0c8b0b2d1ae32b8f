//! Scaffy HTTP server.
//!
//! Wires the core pipeline (validation, submission tracking, sessions, hero
//! settings) into an Axum site: the landing page, the quote forms, the
//! session-gated dashboard and the 404 and page-error pages.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
