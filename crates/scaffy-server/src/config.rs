//! Server configuration for Scaffy.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `SCAFFY_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use scaffy_core::hero::{HeroSettings, MAX_FALLBACK_DELAY, PlaybackMode};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "scaffy-session";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Directory served under `/assets`.
    pub assets_dir: PathBuf,
    /// Business name shown in page titles and the header.
    pub business_name: String,
    /// Landing page hero video and reveal behavior.
    pub hero: HeroSettings,
    /// `email:password;...` accounts for the in-memory session provider.
    pub users: Option<String>,
    /// Lifetime of a signed-in session.
    pub session_ttl: Duration,
    /// Interval between expired-session sweeps.
    pub session_sweep_interval: Duration,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_owned(),
            assets_dir: PathBuf::from("./public"),
            business_name: "Chris.C Scaffolding".to_owned(),
            hero: HeroSettings::default(),
            users: None,
            session_ttl: Duration::from_secs(24 * 60 * 60),
            session_sweep_interval: Duration::from_secs(300),
            secure_cookies: false,
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on, binds to `0.0.0.0`
    /// - `SCAFFY_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:8080`)
    /// - `SCAFFY_LOG_LEVEL`: log filter (default: `info`)
    /// - `SCAFFY_ASSETS_DIR`: static asset directory (default: `./public`)
    /// - `SCAFFY_HERO_VIDEO`: hero video URL, `none` for the static hero
    ///   (default: `/assets/videos/hero-animation.mp4`)
    /// - `SCAFFY_HERO_MODE`: `once` or `loop` (default: `once`)
    /// - `SCAFFY_HERO_FALLBACK_MS`: reveal delay after a playback failure (default: `100`, capped at `5000`)
    /// - `SCAFFY_USERS`: `email:password` pairs separated by `;` (optional)
    /// - `SCAFFY_SESSION_TTL_HOURS`: session lifetime (default: `24`)
    /// - `SCAFFY_SESSION_SWEEP_INTERVAL`: seconds between expiry sweeps (default: `300`)
    /// - `SCAFFY_SECURE_COOKIES`: set `Secure` on the session cookie (default: `false`)
    /// - `SCAFFY_BUSINESS_NAME`: display name (default: `Chris.C Scaffolding`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SiteConfig::from_env`], reading from an arbitrary source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // Priority: SCAFFY_BIND_ADDR > PORT > default 127.0.0.1:8080
        let bind_addr = if let Some(addr) = var("SCAFFY_BIND_ADDR") {
            addr.parse().unwrap_or(defaults.bind_addr)
        } else if let Some(port_str) = var("PORT") {
            let port: u16 = port_str.parse().unwrap_or(8080);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            defaults.bind_addr
        };

        let log_level = var("SCAFFY_LOG_LEVEL").unwrap_or(defaults.log_level);

        let assets_dir = var("SCAFFY_ASSETS_DIR").map_or(defaults.assets_dir, PathBuf::from);

        let video_src = match var("SCAFFY_HERO_VIDEO") {
            Some(v) if v.trim().is_empty() || v.eq_ignore_ascii_case("none") => None,
            Some(v) => Some(v),
            None => defaults.hero.video_src,
        };

        let mode = var("SCAFFY_HERO_MODE")
            .and_then(|v| PlaybackMode::parse(&v))
            .unwrap_or_default();

        let fallback_delay = var("SCAFFY_HERO_FALLBACK_MS")
            .and_then(|v| v.parse().ok())
            .map_or(defaults.hero.fallback_delay, Duration::from_millis)
            .min(MAX_FALLBACK_DELAY);

        let users = var("SCAFFY_USERS").filter(|v| !v.trim().is_empty());

        let session_ttl = var("SCAFFY_SESSION_TTL_HOURS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|h| *h > 0)
            .map_or(defaults.session_ttl, |h| Duration::from_secs(h.saturating_mul(60 * 60)));

        let session_sweep_interval = var("SCAFFY_SESSION_SWEEP_INTERVAL")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|s| *s > 0)
            .map_or(defaults.session_sweep_interval, Duration::from_secs);

        let secure_cookies = var("SCAFFY_SECURE_COOKIES")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(defaults.secure_cookies);

        let business_name = var("SCAFFY_BUSINESS_NAME")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.business_name);

        Self {
            bind_addr,
            log_level,
            assets_dir,
            business_name,
            hero: HeroSettings {
                video_src,
                mode,
                fallback_delay,
            },
            users,
            session_ttl,
            session_sweep_interval,
            secure_cookies,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> SiteConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        SiteConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]);
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(config.hero.mode, PlaybackMode::Once);
        assert_eq!(config.hero.fallback_delay, Duration::from_millis(100));
        assert_eq!(
            config.hero.video_src.as_deref(),
            Some("/assets/videos/hero-animation.mp4")
        );
        assert_eq!(config.session_ttl, Duration::from_secs(86_400));
        assert!(!config.secure_cookies);
    }

    #[test]
    fn bind_addr_beats_port() {
        let config = load(&[("PORT", "9000"), ("SCAFFY_BIND_ADDR", "127.0.0.1:7000")]);
        assert_eq!(config.bind_addr.port(), 7000);

        let config = load(&[("PORT", "9000")]);
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 9000)));
    }

    #[test]
    fn hero_video_can_be_disabled() {
        let config = load(&[("SCAFFY_HERO_VIDEO", "none"), ("SCAFFY_HERO_MODE", "loop")]);
        assert!(config.hero.reveals_immediately());
        assert_eq!(config.hero.mode, PlaybackMode::Looping);
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = load(&[
            ("SCAFFY_HERO_FALLBACK_MS", "soon"),
            ("SCAFFY_SESSION_TTL_HOURS", "0"),
            ("SCAFFY_SESSION_SWEEP_INTERVAL", "-5"),
        ]);
        assert_eq!(config.hero.fallback_delay, Duration::from_millis(100));
        assert_eq!(config.session_ttl, Duration::from_secs(86_400));
        assert_eq!(config.session_sweep_interval, Duration::from_secs(300));
    }

    #[test]
    fn hero_fallback_is_capped() {
        let config = load(&[("SCAFFY_HERO_FALLBACK_MS", "60000")]);
        assert_eq!(config.hero.fallback_delay, Duration::from_millis(5_000));

        let config = load(&[("SCAFFY_HERO_FALLBACK_MS", "250")]);
        assert_eq!(config.hero.fallback_delay, Duration::from_millis(250));
    }
}
