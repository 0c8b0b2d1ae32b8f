//! Session gate.
//!
//! Pages consume authentication through [`SessionProvider`]. The provider
//! issues an opaque bearer token on sign-in; callers keep the token (in a
//! cookie) and hand it back to look the session up.
//!
//! [`MemorySessionProvider`] is the development implementation:
//!
//! - Tokens are UUID v4, returned once and stored only as `SHA-256(token)`.
//! - Password digests are compared with `subtle::ConstantTimeEq`.
//! - Sessions expire after a fixed TTL; [`MemorySessionProvider::purge_expired`]
//!   drops stale entries and is driven by a background sweep.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SiteError;

/// Message returned for unknown users and wrong passwords alike.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid login credentials";

/// Greeting used when an email has no usable local part.
pub const FALLBACK_DISPLAY_NAME: &str = "User";

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

impl User {
    /// Greeting name: the local part of the email with its first letter
    /// capitalised (`joe.bloggs@x.com` gives `Joe.bloggs`). Falls back to
    /// [`FALLBACK_DISPLAY_NAME`] when there is no local part.
    #[must_use]
    pub fn display_name(&self) -> String {
        let local = self.email.split('@').next().unwrap_or_default().trim();
        let mut chars = local.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => FALLBACK_DISPLAY_NAME.to_owned(),
        }
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: User,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Result of a successful password sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// Plaintext bearer token. Only returned here.
    pub token: String,
    pub session: Session,
}

/// Auth-state change notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user: User },
    SignedOut { user: User },
    Expired { user: User },
}

impl AuthEvent {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignedIn { .. } => "signed_in",
            Self::SignedOut { .. } => "signed_out",
            Self::Expired { .. } => "expired",
        }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        match self {
            Self::SignedIn { user } | Self::SignedOut { user } | Self::Expired { user } => user,
        }
    }
}

/// External authentication provider.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Look up the live session for `token`, if any.
    async fn get_session(&self, token: &str) -> Option<Session>;

    /// Subscribe to sign-in / sign-out events.
    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent>;

    /// # Errors
    ///
    /// Returns [`SiteError::Auth`] when the credentials are rejected.
    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<SignedIn, SiteError>;

    /// End the session for `token`. Unknown tokens are ignored.
    async fn sign_out(&self, token: &str);
}

/// Hash a plaintext token or password with SHA-256, hex-encoded.
#[must_use]
pub fn hash_secret(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

/// Parse `email:password` pairs separated by `;`.
///
/// Blank entries are skipped. Emails are trimmed and lowercased.
///
/// # Errors
///
/// Returns [`SiteError::Generic`] naming the first malformed entry.
pub fn parse_user_list(spec: &str) -> Result<Vec<(String, String)>, SiteError> {
    spec.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((email, password)) if !email.trim().is_empty() && !password.is_empty() => {
                Ok((email.trim().to_lowercase(), password.to_owned()))
            }
            _ => Err(SiteError::Generic {
                message: format!("malformed user entry '{entry}', expected email:password"),
                code: Some("INVALID_USER_LIST".to_owned()),
                status: None,
            }),
        })
        .collect()
}

struct Account {
    user: User,
    password_hash: String,
}

/// In-memory [`SessionProvider`] for development and tests.
pub struct MemorySessionProvider {
    accounts: HashMap<String, Account>,
    /// Keyed by token hash.
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
    events: broadcast::Sender<AuthEvent>,
}

impl MemorySessionProvider {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts: HashMap::new(),
            sessions: RwLock::new(HashMap::new()),
            ttl,
            events,
        }
    }

    /// Register an account. Replaces any account with the same email.
    #[must_use]
    pub fn with_user(mut self, email: &str, password: &str) -> Self {
        let email = email.trim().to_lowercase();
        let account = Account {
            user: User {
                id: Uuid::new_v4(),
                email: email.clone(),
            },
            password_hash: hash_secret(password),
        };
        self.accounts.insert(email, account);
        self
    }

    /// Build a provider from an `email:password;...` list.
    ///
    /// # Errors
    ///
    /// Fails when the list is malformed.
    pub fn from_user_list(spec: &str, ttl: Duration) -> Result<Self, SiteError> {
        let provider = parse_user_list(spec)?
            .into_iter()
            .fold(Self::new(ttl), |p, (email, password)| p.with_user(&email, &password));
        info!(accounts = provider.accounts.len(), "session provider ready");
        Ok(provider)
    }

    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every session that has expired. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now()).await
    }

    async fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut expired = Vec::new();
        sessions.retain(|_, session| {
            let keep = !session.is_expired_at(now);
            if !keep {
                expired.push(session.user.clone());
            }
            keep
        });
        drop(sessions);

        for user in &expired {
            let _ = self.events.send(AuthEvent::Expired { user: user.clone() });
        }
        let removed = expired.len();
        if removed > 0 {
            debug!(removed, "purged expired sessions");
        }
        removed
    }

    fn verify(&self, email: &str, password: &str) -> Option<&Account> {
        let account = self.accounts.get(email)?;
        let candidate = hash_secret(password);
        let matches: bool = candidate
            .as_bytes()
            .ct_eq(account.password_hash.as_bytes())
            .into();
        matches.then_some(account)
    }
}

impl std::fmt::Debug for MemorySessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionProvider")
            .field("accounts", &self.accounts.len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionProvider for MemorySessionProvider {
    async fn get_session(&self, token: &str) -> Option<Session> {
        let session = self.sessions.read().await.get(&hash_secret(token)).cloned()?;
        if session.is_expired_at(Utc::now()) {
            return None;
        }
        Some(session)
    }

    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignedIn, SiteError> {
        let email = email.trim().to_lowercase();
        let Some(account) = self.verify(&email, password) else {
            warn!(email = %email, "sign-in rejected");
            return Err(SiteError::auth(INVALID_CREDENTIALS_MESSAGE));
        };

        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let session = Session {
            user: account.user.clone(),
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions
            .write()
            .await
            .insert(hash_secret(&token), session.clone());

        info!(user_id = %session.user.id, "session started");
        let _ = self.events.send(AuthEvent::SignedIn {
            user: session.user.clone(),
        });
        Ok(SignedIn { token, session })
    }

    async fn sign_out(&self, token: &str) {
        let removed = self.sessions.write().await.remove(&hash_secret(token));
        if let Some(session) = removed {
            info!(user_id = %session.user.id, "session ended");
            let _ = self.events.send(AuthEvent::SignedOut { user: session.user });
        }
    }
}
