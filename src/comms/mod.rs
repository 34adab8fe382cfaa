//! Comms subsystem: the ways a member can talk to the bot.
//!
//! # Architecture
//!
//! Each channel (console, web widget) implements [`Component`] and is
//! spawned as an independent task by [`start`] via [`spawn_components`].
//! Channels capture their shared [`Arc<CommsState>`] at construction time.
//!
//! Sessions never share a pipeline: the console owns exactly one, the web
//! channel keeps one per session id.
//!
//! # Starting
//!
//! [`start`] is synchronous. It returns a [`ComponentsHandle`] as soon as
//! the tasks are spawned. The caller decides when to await it.

mod state;
#[cfg(feature = "channel-pty")]
pub mod pty;
#[cfg(feature = "channel-axum")]
pub mod axum_channel;

pub use state::CommsState;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::pipeline::PipelineBuilder;
use crate::runtime::{Component, ComponentsHandle, spawn_components};

/// Spawn all configured channels and return a [`ComponentsHandle`].
///
/// If any channel exits with an error the shared `shutdown` token is
/// cancelled so siblings stop cooperatively. The console ending (quit/EOF)
/// also cancels it.
pub fn start(config: &Config, blueprint: PipelineBuilder, shutdown: CancellationToken) -> ComponentsHandle {
    let state = Arc::new(CommsState::new(blueprint, config.bot_name.clone()));

    let mut components: Vec<Box<dyn Component>> = Vec::new();

    #[cfg(feature = "channel-pty")]
    {
        if config.comms.pty.enabled {
            info!("loading pty channel");
            components.push(Box::new(pty::PtyChannel::new("pty0", state.clone())));
        }
    }

    #[cfg(feature = "channel-axum")]
    {
        if config.comms.axum_channel.enabled {
            info!(bind = %config.comms.axum_channel.bind, "loading axum channel");
            components.push(Box::new(axum_channel::AxumChannel::new(
                "axum0",
                config.comms.axum_channel.bind.clone(),
                config.comms.axum_channel.session_idle,
                state.clone(),
            )));
        }
    }

    #[cfg(not(feature = "channel-axum"))]
    if config.comms.axum_channel.enabled {
        warn!("axum channel configured but not compiled in");
    }

    if components.is_empty() {
        warn!("no comms channels enabled");
    }

    spawn_components(components, shutdown)
}
