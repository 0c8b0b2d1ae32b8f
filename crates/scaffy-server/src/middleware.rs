//! Session middleware for Scaffy.
//!
//! Reads the `scaffy-session` cookie, resolves it against the session
//! provider, and injects a [`CurrentSession`] into the request extensions.
//! Pages decide for themselves whether a missing session is a problem.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;

use scaffy_core::auth::Session;

use crate::config::{SESSION_COOKIE, SiteConfig};
use crate::state::AppState;

/// Session context injected into request extensions.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    /// Raw cookie token, present even when it no longer resolves.
    pub token: Option<String>,
    pub session: Option<Session>,
}

impl CurrentSession {
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }
}

/// Middleware that resolves the session cookie on every request.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = session_token(req.headers());

    let session = match &token {
        Some(token) => state.sessions.get_session(token).await,
        None => None,
    };

    if token.is_some() && session.is_none() {
        tracing::debug!("session cookie did not resolve");
    }

    req.extensions_mut().insert(CurrentSession { token, session });
    next.run(req).await
}

/// Extract the session token from the `Cookie` header(s).
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value that stores `token` for the configured session lifetime.
///
/// Returns `None` only if the token contains bytes not allowed in a header.
#[must_use]
pub fn session_cookie(config: &SiteConfig, token: &str) -> Option<HeaderValue> {
    let secure = if config.secure_cookies { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
        config.session_ttl.as_secs()
    ))
    .ok()
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_session_cookie(config: &SiteConfig) -> HeaderValue {
    if config.secure_cookies {
        HeaderValue::from_static("scaffy-session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure")
    } else {
        HeaderValue::from_static("scaffy-session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn token_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; scaffy-session=abc123; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn empty_or_missing_token_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("scaffy-session="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn cookie_carries_ttl_and_flags() {
        let config = SiteConfig {
            secure_cookies: true,
            ..SiteConfig::default()
        };
        let value = session_cookie(&config, "tok").unwrap();
        let text = value.to_str().unwrap();
        assert!(text.starts_with("scaffy-session=tok;"));
        assert!(text.contains("HttpOnly"));
        assert!(text.contains("Max-Age=86400"));
        assert!(text.ends_with("; Secure"));
    }

    #[test]
    fn clearing_cookie_expires_it() {
        let value = clear_session_cookie(&SiteConfig::default());
        assert!(value.to_str().unwrap().contains("Max-Age=0"));
    }
}
