//! Shared application state for the Scaffy server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It holds the configuration, the session provider
//! and the lead sink.

use std::sync::Arc;

use scaffy_core::auth::SessionProvider;
use scaffy_core::leads::LeadSink;

use crate::config::SiteConfig;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    pub config: SiteConfig,
    /// Sign-in, session lookup and sign-out.
    pub sessions: Arc<dyn SessionProvider>,
    /// Destination for quote submissions.
    pub leads: Arc<dyn LeadSink>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: SiteConfig,
        sessions: Arc<dyn SessionProvider>,
        leads: Arc<dyn LeadSink>,
    ) -> Self {
        Self {
            config,
            sessions,
            leads,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
