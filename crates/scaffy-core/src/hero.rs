//! Hero reveal sequencing.
//!
//! The landing page plays a background video and only shows its
//! call-to-action once the video has finished (or, for looping videos, is
//! ready to play). If playback never starts the content is revealed after a
//! short fallback delay, so a missing or undecodable asset never blocks the
//! page.
//!
//! [`HeroReveal`] is the pure transition table. [`HeroController`] drives it
//! against any [`HeroMedia`] using a tokio timer for the fallback.
//!
//! ```text
//! Loading ──PlayStarted──▶ Playing ──Ended / CanPlay(loop)──▶ Revealed
//!    │                        │                                  ▲
//!    └─PlayRejected/Failed──▶ Failed ──FallbackElapsed / Ended──┘
//! ```
//!
//! `Revealed` is terminal. The reveal effect is emitted at most once.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::Sleep;
use tracing::{debug, info};

/// Default delay before revealing when playback cannot start.
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(100);

/// Longest the hero may stay hidden after playback fails to start.
pub const MAX_FALLBACK_DELAY: Duration = Duration::from_millis(5_000);

/// Where the hero is in its reveal sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoPhase {
    Loading,
    Playing,
    Failed,
    Revealed,
}

/// How the background video is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    /// Play through once and reveal on `ended`.
    #[default]
    Once,
    /// Loop forever and reveal on first `canplay`.
    Looping,
}

impl PlaybackMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Looping => "loop",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "once" => Some(Self::Once),
            "loop" | "looping" => Some(Self::Looping),
            _ => None,
        }
    }
}

/// Inputs to the reveal state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroEvent {
    PlayStarted,
    PlayRejected,
    CanPlay,
    Ended,
    MediaFailed,
    FallbackElapsed,
}

/// What the driver must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroEffect {
    None,
    ScheduleFallback,
    Reveal,
}

/// The reveal transition table.
#[derive(Debug, Clone)]
pub struct HeroReveal {
    phase: VideoPhase,
    mode: PlaybackMode,
}

impl HeroReveal {
    #[must_use]
    pub fn new(mode: PlaybackMode) -> Self {
        Self {
            phase: VideoPhase::Loading,
            mode,
        }
    }

    #[must_use]
    pub fn phase(&self) -> VideoPhase {
        self.phase
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.phase == VideoPhase::Revealed
    }

    /// Apply one event. Pairs missing from the table leave the phase as is.
    pub fn apply(&mut self, event: HeroEvent) -> HeroEffect {
        use HeroEvent as E;
        use VideoPhase as P;

        let looping = self.mode == PlaybackMode::Looping;
        let (next, effect) = match (self.phase, event) {
            (P::Revealed, _) => (P::Revealed, HeroEffect::None),

            (P::Loading, E::PlayStarted) => (P::Playing, HeroEffect::None),
            (P::Loading | P::Playing, E::PlayRejected | E::MediaFailed) => {
                (P::Failed, HeroEffect::ScheduleFallback)
            }
            (P::Loading | P::Playing, E::CanPlay) if looping => (P::Revealed, HeroEffect::Reveal),
            (P::Playing, E::Ended) => (P::Revealed, HeroEffect::Reveal),

            (P::Failed, E::FallbackElapsed | E::Ended | E::CanPlay) => {
                (P::Revealed, HeroEffect::Reveal)
            }

            (phase, _) => (phase, HeroEffect::None),
        };

        if next != self.phase {
            debug!(from = ?self.phase, to = ?next, ?event, "hero phase transition");
        }
        self.phase = next;
        effect
    }

    /// Jump straight to `Revealed`. Returns `Reveal` unless already there.
    pub fn force_reveal(&mut self) -> HeroEffect {
        if self.is_revealed() {
            return HeroEffect::None;
        }
        self.phase = VideoPhase::Revealed;
        HeroEffect::Reveal
    }
}

/// Records whether the reveal sequence already ran for the current page load.
///
/// Clones share the flag. A fresh value is created per page load and handed
/// to every controller mounted during it.
#[derive(Debug, Clone, Default)]
pub struct RevealSession {
    started: Arc<AtomicBool>,
}

impl RevealSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the sequence. Only the first caller gets `true`.
    pub fn claim(&self) -> bool {
        !self.started.swap(true, Ordering::AcqRel)
    }

    #[must_use]
    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

/// Media failures. Never surfaced to the user, only logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("autoplay prevented: {0}")]
    AutoplayBlocked(String),
    #[error("media decode failed: {0}")]
    Decode(String),
    #[error("media network error: {0}")]
    Network(String),
}

/// Events emitted by a playing media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    CanPlay,
    Ended,
    Error(MediaError),
}

impl From<&MediaEvent> for HeroEvent {
    fn from(event: &MediaEvent) -> Self {
        match event {
            MediaEvent::CanPlay => Self::CanPlay,
            MediaEvent::Ended => Self::Ended,
            MediaEvent::Error(_) => Self::MediaFailed,
        }
    }
}

/// A background video the controller can start and listen to.
#[async_trait::async_trait]
pub trait HeroMedia: Send {
    /// Attempt to start playback.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError`] when playback cannot start.
    async fn play(&mut self) -> Result<(), MediaError>;

    /// Wait for the next media event. `None` once the element is gone.
    async fn next_event(&mut self) -> Option<MediaEvent>;
}

/// Hero settings shared by the server-rendered page and the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroSettings {
    /// Video URL. `None` renders the static gradient and shows content at once.
    pub video_src: Option<String>,
    pub mode: PlaybackMode,
    pub fallback_delay: Duration,
}

impl Default for HeroSettings {
    fn default() -> Self {
        Self {
            video_src: Some("/assets/videos/hero-animation.mp4".to_owned()),
            mode: PlaybackMode::Once,
            fallback_delay: DEFAULT_FALLBACK_DELAY,
        }
    }
}

impl HeroSettings {
    /// Whether the call-to-action is visible before any media event.
    #[must_use]
    pub fn reveals_immediately(&self) -> bool {
        self.video_src.is_none()
    }
}

/// Drives one hero mount from `Loading` to `Revealed`.
#[derive(Debug, Clone)]
pub struct HeroController {
    session: RevealSession,
    mode: PlaybackMode,
    fallback_delay: Duration,
}

impl HeroController {
    #[must_use]
    pub fn new(session: RevealSession, settings: &HeroSettings) -> Self {
        Self {
            session,
            mode: settings.mode,
            fallback_delay: settings.fallback_delay.min(MAX_FALLBACK_DELAY),
        }
    }

    /// Run the sequence and call `on_reveal_ready` once content may show.
    ///
    /// A second mount within the same [`RevealSession`] reveals immediately
    /// without touching the media. Returns the final phase, which is always
    /// [`VideoPhase::Revealed`].
    pub async fn run<M, F>(&self, media: &mut M, mut on_reveal_ready: F) -> VideoPhase
    where
        M: HeroMedia + ?Sized,
        F: FnMut(),
    {
        let mut machine = HeroReveal::new(self.mode);

        if !self.session.claim() {
            debug!("hero sequence already ran for this page load, revealing");
            if machine.force_reveal() == HeroEffect::Reveal {
                on_reveal_ready();
            }
            return machine.phase();
        }

        let mut effect = match media.play().await {
            Ok(()) => machine.apply(HeroEvent::PlayStarted),
            Err(e) => {
                info!(error = %e, "hero video did not start, falling back");
                machine.apply(HeroEvent::PlayRejected)
            }
        };

        let mut fallback: Option<Pin<Box<Sleep>>> = None;
        let mut media_open = true;

        loop {
            match effect {
                HeroEffect::Reveal => on_reveal_ready(),
                HeroEffect::ScheduleFallback => {
                    if fallback.is_none() {
                        fallback = Some(Box::pin(tokio::time::sleep(self.fallback_delay)));
                    }
                }
                HeroEffect::None => {}
            }

            if machine.is_revealed() {
                return machine.phase();
            }

            // Nothing left that could ever trigger a reveal.
            if !media_open && fallback.is_none() {
                effect = machine.force_reveal();
                continue;
            }

            effect = tokio::select! {
                () = wait_for(&mut fallback) => machine.apply(HeroEvent::FallbackElapsed),
                event = media.next_event(), if media_open => match event {
                    Some(event) => {
                        if let MediaEvent::Error(ref e) = event {
                            info!(error = %e, "hero video failed");
                        }
                        machine.apply(HeroEvent::from(&event))
                    }
                    None => {
                        media_open = false;
                        machine.apply(HeroEvent::MediaFailed)
                    }
                },
            };
        }
    }
}

/// Resolve when the fallback timer fires, or never if none is armed.
async fn wait_for(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
