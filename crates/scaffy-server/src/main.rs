//! Scaffy server entry point.
//!
//! Loads configuration, builds the session provider and lead sink, then
//! starts the Axum HTTP server with graceful shutdown. A session sweep
//! worker and an auth event logger run alongside the server and stop on
//! shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use scaffy_core::auth::{AuthEvent, MemorySessionProvider, SessionProvider};
use scaffy_core::leads::LoggingLeadSink;

use scaffy_server::config::SiteConfig;
use scaffy_server::routes;
use scaffy_server::state::AppState;

/// How long to wait for background workers after the server stops.
const WORKER_JOIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = SiteConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(
        business = %config.business_name,
        hero_mode = config.hero.mode.as_str(),
        hero_video = config.hero.video_src.as_deref().unwrap_or("-"),
        "Scaffy starting"
    );

    let sessions = Arc::new(build_session_provider(&config)?);
    if sessions.account_count() == 0 {
        warn!("no accounts configured (set SCAFFY_USERS); sign-in will always fail");
    }

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&sessions) as Arc<dyn SessionProvider>,
        Arc::new(LoggingLeadSink),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweep_handle = {
        let provider = Arc::clone(&sessions);
        let mut rx = shutdown_rx.clone();
        let interval = config.session_sweep_interval;
        tokio::spawn(async move {
            session_sweep_worker(provider, &mut rx, interval).await;
        })
    };

    let events_handle = {
        let events = sessions.on_auth_state_change();
        let mut rx = shutdown_rx;
        tokio::spawn(async move {
            auth_event_logger(events, &mut rx).await;
        })
    };

    let app = routes::build_router(Arc::clone(&state));

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Scaffy server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("server error")?;

    info!("waiting for background workers to stop");
    let _ = tokio::time::timeout(WORKER_JOIN_TIMEOUT, async {
        let _ = sweep_handle.await;
        let _ = events_handle.await;
    })
    .await;

    info!("Scaffy server stopped");
    Ok(())
}

fn build_session_provider(config: &SiteConfig) -> anyhow::Result<MemorySessionProvider> {
    let ttl = chrono::Duration::from_std(config.session_ttl)
        .context("session TTL is out of range")?;
    match config.users.as_deref() {
        Some(list) => MemorySessionProvider::from_user_list(list, ttl)
            .context("failed to parse SCAFFY_USERS"),
        None => Ok(MemorySessionProvider::new(ttl)),
    }
}

/// Periodically drop expired sessions until shutdown.
async fn session_sweep_worker(
    provider: Arc<MemorySessionProvider>,
    shutdown: &mut watch::Receiver<bool>,
    every: Duration,
) {
    let mut interval = tokio::time::interval(every);
    info!(interval_secs = every.as_secs(), "session sweep worker started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let removed = provider.purge_expired().await;
                if removed > 0 {
                    info!(removed, "session sweep tick complete");
                }
            }
            _ = shutdown.changed() => {
                info!("session sweep worker shutting down");
                return;
            }
        }
    }
}

/// Log every auth-state change until shutdown or the channel closes.
async fn auth_event_logger(
    mut events: broadcast::Receiver<AuthEvent>,
    shutdown: &mut watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => info!(
                    event = event.as_str(),
                    user_id = %event.user().id,
                    "auth state changed"
                ),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "auth event logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return,
            },
            _ = shutdown.changed() => {
                info!("auth event logger shutting down");
                return;
            }
        }
    }
}

/// Wait for SIGINT or SIGTERM, then broadcast shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    let _ = shutdown_tx.send(true);
}
