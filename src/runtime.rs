//! Component runtime: shared scaffolding for the comms channels.
//!
//! # Component model
//!
//! A [`Component`] is any independently-runnable unit: the console loop,
//! the web channel. Components are constructed with their shared state
//! already captured inside them, then handed to [`spawn_components`].
//!
//! Any component error cancels the shared [`CancellationToken`] so sibling
//! components shut down cleanly. A component that exits `Ok` on its own
//! (e.g. the console after `quit`) also cancels the token when it is the
//! foreground component; see [`Component::ends_session`].

use std::future::Future;
use std::pin::Pin;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::AppError;

// ── Component ─────────────────────────────────────────────────────────────────

/// A boxed, owned future returned by [`Component::run`].
pub type ComponentFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

/// A self-contained, concurrently-runnable unit.
///
/// Implementors capture all shared state at construction time.
/// [`Component::run`] is called once by [`spawn_components`] and should run
/// until `shutdown` is cancelled or the component's own work is done.
pub trait Component: Send + 'static {
    /// Stable identifier used in log messages.
    fn id(&self) -> &str;

    /// Whether a clean exit of this component should stop the whole process.
    fn ends_session(&self) -> bool {
        false
    }

    /// Consume the component and return its async run-loop as a boxed future.
    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture;
}

// ── ComponentsHandle ──────────────────────────────────────────────────────────

/// Handle to a running component set. `.join()` resolves once every
/// component has exited.
pub struct ComponentsHandle {
    inner: JoinHandle<Result<(), AppError>>,
}

impl ComponentsHandle {
    /// Await all components and return the first error, if any.
    pub async fn join(self) -> Result<(), AppError> {
        match self.inner.await {
            Ok(r) => r,
            Err(e) => Err(AppError::Comms(format!("component set panicked: {e}"))),
        }
    }
}

// ── spawn_components ──────────────────────────────────────────────────────────

/// Spawn each [`Component`] as an independent Tokio task.
///
/// - If any component returns `Err`, `shutdown` is cancelled so all siblings
///   receive the cancellation signal and stop cooperatively.
/// - The manager task then drains the remaining components and returns the
///   first error encountered.
pub fn spawn_components(components: Vec<Box<dyn Component>>, shutdown: CancellationToken) -> ComponentsHandle {
    let handle = tokio::spawn(async move {
        let mut set: JoinSet<(String, bool, Result<(), AppError>)> = JoinSet::new();

        for component in components {
            let id = component.id().to_string();
            let ends_session = component.ends_session();
            let shutdown = shutdown.clone();
            debug!(component = %id, "spawning component");
            let fut = component.run(shutdown);
            set.spawn(async move { (id, ends_session, fut.await) });
        }

        let mut first_err: Option<AppError> = None;

        while let Some(res) = set.join_next().await {
            match res {
                Err(e) => {
                    error!("component panicked: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert_with(|| AppError::Comms(format!("component panicked: {e}")));
                }
                Ok((id, _, Err(e))) => {
                    error!(component = %id, "component error: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert(e);
                }
                Ok((id, ends_session, Ok(()))) => {
                    debug!(component = %id, "component exited");
                    if ends_session && !shutdown.is_cancelled() {
                        info!(component = %id, "session ended, shutting down");
                        shutdown.cancel();
                    }
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    });

    ComponentsHandle { inner: handle }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Waits(&'static str);

    impl Component for Waits {
        fn id(&self) -> &str {
            self.0
        }

        fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
            Box::pin(async move {
                shutdown.cancelled().await;
                Ok(())
            })
        }
    }

    struct Fails;

    impl Component for Fails {
        fn id(&self) -> &str {
            "fails"
        }

        fn run(self: Box<Self>, _shutdown: CancellationToken) -> ComponentFuture {
            Box::pin(async { Err(AppError::Comms("bind failed".into())) })
        }
    }

    struct Finishes;

    impl Component for Finishes {
        fn id(&self) -> &str {
            "finishes"
        }

        fn ends_session(&self) -> bool {
            true
        }

        fn run(self: Box<Self>, _shutdown: CancellationToken) -> ComponentFuture {
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn error_cancels_siblings_and_is_returned() {
        let token = CancellationToken::new();
        let handle = spawn_components(vec![Box::new(Waits("a")), Box::new(Fails)], token.clone());
        let err = handle.join().await.unwrap_err();
        assert!(err.to_string().contains("bind failed"));
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn foreground_exit_stops_background() {
        let token = CancellationToken::new();
        let handle = spawn_components(vec![Box::new(Waits("web")), Box::new(Finishes)], token.clone());
        handle.join().await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn external_cancel_drains_all() {
        let token = CancellationToken::new();
        let handle = spawn_components(vec![Box::new(Waits("a")), Box::new(Waits("b"))], token.clone());
        token.cancel();
        handle.join().await.unwrap();
    }

    #[tokio::test]
    async fn empty_set_resolves() {
        spawn_components(vec![], CancellationToken::new()).join().await.unwrap();
    }
}
