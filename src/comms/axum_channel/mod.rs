//! Axum-based HTTP channel: the web chat widget and its JSON API.
//!
//! Implements [`Component`] so it slots into the comms lifecycle: `run()`
//! drives the axum event loop and the shared [`CancellationToken`] is wired
//! to axum's graceful shutdown.
//!
//! ## URL layout
//!
//! ```text
//! GET  /api/health
//! GET  /api/settings             slider ranges for the widget
//! POST /api/message
//! GET  /api/session/{id}         message list
//! POST /api/session/{id}/clear
//! GET  /favicon.ico              → 204
//! GET  /                         → widget HTML
//! ```
//!
//! Every session id maps to its own [`MessagePipeline`] behind a
//! `tokio::sync::Mutex`, so turns within one session run one at a time
//! while sessions proceed independently. Idle sessions are evicted after
//! `[comms.axum_channel] session_idle_minutes`.

mod api;
mod ui;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::conversation::Turn;
use crate::error::AppError;
use crate::pipeline::{GREETING, MessagePipeline};
use crate::runtime::{Component, ComponentFuture};

use super::state::CommsState;

// ── Session registry ──────────────────────────────────────────────────────────

pub(crate) type SharedPipeline = Arc<Mutex<MessagePipeline>>;

struct SessionEntry {
    pipeline: SharedPipeline,
    last_used: Instant,
}

/// Live web sessions keyed by session id.
///
/// A session is evicted once it has gone `idle` without a request, checked
/// whenever the registry is touched. Sessions with a turn in flight are
/// never evicted.
pub(crate) struct Sessions {
    idle: Duration,
    inner: RwLock<HashMap<String, SessionEntry>>,
}

/// Opening assistant turn of every web session. Shown, never sent upstream.
pub(crate) fn greeting() -> Turn {
    Turn::assistant(GREETING).display_only()
}

impl Sessions {
    pub(crate) fn new(idle: Duration) -> Self {
        Self { idle, inner: RwLock::new(HashMap::new()) }
    }

    /// The live session `id`, marked as used now.
    pub(crate) async fn get(&self, id: &str) -> Option<SharedPipeline> {
        let now = Instant::now();
        let mut map = self.inner.write().await;
        self.evict_idle(&mut map, now);
        let entry = map.get_mut(id)?;
        entry.last_used = now;
        Some(entry.pipeline.clone())
    }

    /// Register a new session whose history starts with the greeting.
    pub(crate) async fn create(&self, id: String, comms: &CommsState) -> SharedPipeline {
        let mut pipeline = comms.new_pipeline();
        pipeline.seed(greeting());
        let shared = Arc::new(Mutex::new(pipeline));

        let now = Instant::now();
        let mut map = self.inner.write().await;
        self.evict_idle(&mut map, now);
        map.insert(id.clone(), SessionEntry { pipeline: shared.clone(), last_used: now });
        info!(session_id = %id, live = map.len(), "web session started");
        shared
    }

    /// Sessions that have not yet gone idle.
    pub(crate) async fn len(&self) -> usize {
        let now = Instant::now();
        self.inner.read().await.values().filter(|e| self.is_live(e, now)).count()
    }

    fn is_live(&self, entry: &SessionEntry, now: Instant) -> bool {
        Arc::strong_count(&entry.pipeline) > 1 || now.duration_since(entry.last_used) < self.idle
    }

    fn evict_idle(&self, map: &mut HashMap<String, SessionEntry>, now: Instant) {
        let before = map.len();
        map.retain(|_, e| self.is_live(e, now));
        let evicted = before - map.len();
        if evicted > 0 {
            info!(evicted, live = map.len(), "idle web sessions evicted");
        }
    }
}

// ── Shared request state ──────────────────────────────────────────────────────

/// Axum router state injected into every handler via [`axum::extract::State`].
///
/// All fields are reference-counted.
#[derive(Clone)]
pub(crate) struct AxumState {
    /// Channel identifier used in log spans.
    pub channel_id: Arc<str>,
    pub comms: Arc<CommsState>,
    pub sessions: Arc<Sessions>,
}

// ── AxumChannel ───────────────────────────────────────────────────────────────

pub struct AxumChannel {
    channel_id: String,
    bind_addr: String,
    session_idle: Duration,
    state: Arc<CommsState>,
}

impl AxumChannel {
    pub fn new(
        channel_id: impl Into<String>,
        bind_addr: impl Into<String>,
        session_idle: Duration,
        state: Arc<CommsState>,
    ) -> Self {
        Self { channel_id: channel_id.into(), bind_addr: bind_addr.into(), session_idle, state }
    }
}

impl Component for AxumChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        let Self { channel_id, bind_addr, session_idle, state } = *self;
        let app = router(&channel_id, state, session_idle);
        Box::pin(run_axum(channel_id, bind_addr, app, shutdown))
    }
}

// ── Server loop ───────────────────────────────────────────────────────────────

async fn run_axum(
    channel_id: String,
    bind_addr: String,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Comms(format!("axum bind failed on {bind_addr}: {e}")))?;

    info!(%channel_id, %bind_addr, "axum channel listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Comms(format!("axum server error: {e}")))?;

    info!(%channel_id, "axum channel shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the widget router with an empty session registry whose sessions
/// expire after `session_idle` without a request.
pub fn router(channel_id: &str, comms: Arc<CommsState>, session_idle: Duration) -> Router {
    build_router(AxumState {
        channel_id: Arc::from(channel_id),
        comms,
        sessions: Arc::new(Sessions::new(session_idle)),
    })
}

fn build_router(state: AxumState) -> Router {
    Router::new()
        .route("/api/health",                    get(api::health))
        .route("/api/settings",                  get(api::settings))
        .route("/api/message",                   post(api::message))
        .route("/api/session/{session_id}",       get(api::session_detail))
        .route("/api/session/{session_id}/clear", post(api::session_clear))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/",            get(ui::root))
        .with_state(state)
}
