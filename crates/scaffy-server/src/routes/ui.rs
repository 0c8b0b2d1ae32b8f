//! Landing page.
//!
//! Serves the hero at `/`. The reveal sequence runs in the browser: the page
//! carries the playback mode and fallback delay as `data-` attributes, and a
//! small inline script applies the same transition table as
//! [`scaffy_core::hero::HeroReveal`]. With no video configured the call to
//! action is rendered visible from the start.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;

use scaffy_core::hero::{HeroSettings, PlaybackMode};

use super::page::{document_with_head, escape_html};
use crate::state::AppState;

/// Build the landing page router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(landing_page))
}

// ── Landing page ─────────────────────────────────────────────────────

async fn landing_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let config = &state.config;
    let brand = escape_html(&config.business_name);

    let body = LANDING_BODY
        .replace("{{HERO_ATTRS}}", &hero_attrs(&config.hero))
        .replace("{{HERO_MEDIA}}", &hero_media(&config.hero))
        .replace(
            "{{CONTENT_ATTRS}}",
            if config.hero.reveals_immediately() {
                ""
            } else {
                r#" aria-hidden="true""#
            },
        )
        .replace("{{BRAND}}", &brand);

    Html(document_with_head(
        &config.business_name,
        LANDING_HEAD,
        &body,
    ))
}

fn hero_attrs(hero: &HeroSettings) -> String {
    let class = if hero.reveals_immediately() {
        "hero revealed"
    } else {
        "hero"
    };
    format!(
        r#"class="{class}" data-mode="{mode}" data-fallback-ms="{delay}""#,
        mode = hero.mode.as_str(),
        delay = hero.fallback_delay.as_millis(),
    )
}

fn hero_media(hero: &HeroSettings) -> String {
    match &hero.video_src {
        Some(src) => {
            let looping = if hero.mode == PlaybackMode::Looping {
                " loop"
            } else {
                ""
            };
            format!(
                r#"<video id="hero-video" class="hero-media" src="{src}" muted playsinline preload="auto"{looping}></video>"#,
                src = escape_html(src),
            )
        }
        None => r#"<div class="hero-media hero-static" aria-hidden="true"></div>"#.to_owned(),
    }
}

/// Landing-only styles and the noscript fallback.
const LANDING_HEAD: &str = r##"<style>
.hero{position:relative;min-height:100vh;overflow:hidden;display:flex;align-items:center;justify-content:center;background:#0E0E0E}
.hero-media{position:absolute;inset:0;width:100%;height:100%;object-fit:cover}
.hero-static{background:radial-gradient(ellipse at 30% 20%,rgba(245,200,66,.18),transparent 60%),linear-gradient(160deg,#141414 0%,#1F2529 60%,#2B3338 100%)}
.hero-content{position:relative;z-index:10;display:flex;flex-direction:column;align-items:center;gap:14px;width:100%;max-width:420px;padding:0 16px;opacity:0;transform:translateY(20px);transition:opacity .6s,transform .5s .2s;pointer-events:none}
.hero.revealed .hero-content{opacity:1;transform:none;pointer-events:auto}
.hero-brand{position:absolute;top:24px;left:24px;z-index:10;font-weight:800;color:var(--gold)}
.cta-main{display:flex;flex-direction:column;align-items:center;width:100%;padding:16px;border-radius:16px;background:linear-gradient(135deg,#F5C842,#E8A817);color:#141414}
.cta-main strong{font-size:20px;font-weight:800;letter-spacing:-.3px}
.cta-main span{font-size:12px;font-weight:700;opacity:.9}
.cta-row{display:grid;grid-template-columns:1fr 1fr;gap:12px;width:100%}
.cta-secondary{display:flex;flex-direction:column;align-items:center;padding:12px;border-radius:14px;background:rgba(30,30,30,.85);border:1px solid var(--border)}
.cta-secondary strong{font-size:14px;font-weight:800}
.cta-secondary span{font-size:10px;font-weight:600;color:var(--muted)}
.about{max-width:1100px;margin:0 auto;padding:64px 24px;display:grid;grid-template-columns:repeat(auto-fit,minmax(220px,1fr));gap:16px}
</style>
<noscript><style>.hero-content{opacity:1;transform:none;pointer-events:auto}</style></noscript>
"##;

/// HTML body for the landing page.
const LANDING_BODY: &str = r##"<section id="hero" {{HERO_ATTRS}}>
  {{HERO_MEDIA}}
  <a class="hero-brand" href="/">{{BRAND}}</a>
  <div id="hero-content" class="hero-content"{{CONTENT_ATTRS}}>
    <a class="cta-main" href="/quote-selection"><strong>GET A QUOTE</strong><span>&#9889; Same Day Response</span></a>
    <div class="cta-row">
      <a class="cta-secondary" href="#about"><strong>TAKE A LOOK</strong><span>FIND OUT MORE</span></a>
      <a class="cta-secondary" href="/auth"><strong>LOG IN</strong><span>MANAGE JOBS</span></a>
    </div>
  </div>
</section>
<section id="about" class="about">
  <div class="card"><h3>Safety First</h3><p>Building Your Future, Safely</p></div>
  <div class="card"><h3>Premium Quality</h3><p>Professional scaffolding solutions</p></div>
  <div class="card"><h3>Expert Team</h3><p>Experienced &amp; certified professionals</p></div>
  <div class="card"><h3>Full Service</h3><p>From setup to takedown</p></div>
</section>
<script>
(function () {
  var hero = document.getElementById('hero');
  var content = document.getElementById('hero-content');
  var video = document.getElementById('hero-video');
  if (!hero || !content) return;

  var phase = 'loading';
  var looping = hero.dataset.mode === 'loop';
  var delay = parseInt(hero.dataset.fallbackMs, 10);
  if (!(delay >= 0)) delay = 100;
  var timer = null;

  function reveal() {
    phase = 'revealed';
    if (timer) { clearTimeout(timer); timer = null; }
    hero.classList.add('revealed');
    content.removeAttribute('aria-hidden');
  }

  function fail() {
    phase = 'failed';
    if (!timer) timer = setTimeout(function () { timer = null; apply('fallback'); }, delay);
  }

  function apply(event) {
    if (phase === 'revealed') return;
    if (phase === 'failed') {
      if (event === 'fallback' || event === 'ended' || event === 'canplay') reveal();
      return;
    }
    if (event === 'started' && phase === 'loading') { phase = 'playing'; return; }
    if (event === 'rejected' && phase === 'loading') { fail(); return; }
    if (event === 'error') { fail(); return; }
    if (event === 'canplay' && looping) { reveal(); return; }
    if (event === 'ended' && phase === 'playing') reveal();
  }

  if (!video || window.__scaffyHeroStarted) { reveal(); return; }
  window.__scaffyHeroStarted = true;

  video.addEventListener('canplay', function () { apply('canplay'); });
  video.addEventListener('ended', function () { apply('ended'); });
  video.addEventListener('error', function () { apply('error'); });

  var started = video.play();
  if (started && typeof started.then === 'function') {
    started.then(function () { apply('started'); }, function () { apply('rejected'); });
  } else {
    apply('started');
  }
})();
</script>"##;
