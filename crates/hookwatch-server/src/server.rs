//! Exposition server.
//!
//! Lifecycle: `Unstarted -> Running -> Stopped`. [`Server::start`] binds the
//! port and serves from a spawned task, returning immediately; bind and serve
//! failures are logged. [`Server::stop`] stops accepting, waits up to
//! [`GRACE_PERIOD`] for in-flight requests, then aborts the serve task.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::MethodRouter;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use hookwatch_core::{Provider, Result};

use crate::config::ServerSection;
use crate::{ops, router};

/// How long `stop` waits for in-flight requests.
pub const GRACE_PERIOD: Duration = Duration::from_secs(30);

/// A path served by the exposition server, listed on the index page.
#[derive(Clone)]
pub struct Handler {
    pub path: String,
    pub description: String,
    pub route: MethodRouter,
    /// The route bounds its own duration and is exempt from the server's request timeout.
    pub self_bounded: bool,
}

impl Handler {
    pub fn new(path: impl Into<String>, description: impl Into<String>, route: MethodRouter) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            route,
            self_bounded: false,
        }
    }

    pub fn self_bounded(mut self) -> Self {
        self.self_bounded = true;
        self
    }
}

enum State {
    Unstarted,
    Running {
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<()>,
        addr: SocketAddr,
    },
    Stopped,
}

pub struct Server {
    port: u16,
    handlers: Vec<Handler>,
    state: State,
}

impl Server {
    /// Build a server for `metrics`, plus the diagnostic handlers when `debug` is set.
    pub fn new(port: u16, metrics: Handler, debug: bool) -> Self {
        let mut handlers = vec![metrics];
        if debug {
            handlers.extend(ops::debug::handlers());
        }
        Self {
            port,
            handlers,
            state: State::Unstarted,
        }
    }

    pub fn from_config(cfg: &ServerSection, provider: Arc<Provider>) -> Result<Self> {
        Ok(Self::new(cfg.port()?, ops::metrics_handler(provider), cfg.debug))
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// Bound address while running (resolves port 0 to the ephemeral port).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            State::Running { addr, .. } => Some(*addr),
            _ => None,
        }
    }

    /// Bind and start serving in the background. Must be called within a Tokio runtime.
    pub fn start(&mut self) {
        if !matches!(self.state, State::Unstarted) {
            tracing::warn!("exposition server already started");
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(error = %e, "exposition server needs a tokio runtime");
                return;
            }
        };

        let bind = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = match std::net::TcpListener::bind(bind).and_then(|l| {
            l.set_nonblocking(true)?;
            Ok(l)
        }) {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(addr = %bind, error = %e, "exposition server bind failed");
                self.state = State::Stopped;
                return;
            }
        };
        let addr = listener.local_addr().unwrap_or(bind);

        let app = router::build_router(&self.handlers);
        let (shutdown, rx) = oneshot::channel::<()>();

        let task = runtime.spawn(async move {
            let listener = match tokio::net::TcpListener::from_std(listener) {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!(%addr, error = %e, "exposition server listener failed");
                    return;
                }
            };
            tracing::info!(%addr, "exposition server listening");

            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!(%addr, error = %e, "exposition server failed");
            }
            tracing::info!(%addr, "exposition server stopped");
        });

        self.state = State::Running { shutdown, task, addr };
    }

    /// Graceful shutdown bounded by [`GRACE_PERIOD`].
    pub async fn stop(&mut self) {
        match std::mem::replace(&mut self.state, State::Stopped) {
            State::Running {
                shutdown,
                mut task,
                addr,
            } => {
                tracing::info!(%addr, "exposition server shutting down");
                let _ = shutdown.send(());
                match tokio::time::timeout(GRACE_PERIOD, &mut task).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::error!(%addr, error = %e, "exposition server task failed"),
                    Err(_) => {
                        tracing::error!(%addr, grace = ?GRACE_PERIOD, "graceful shutdown timed out, closing");
                        task.abort();
                    }
                }
            }
            State::Unstarted => {
                tracing::warn!("exposition server stopped before start");
            }
            State::Stopped => {
                tracing::warn!("exposition server already stopped");
            }
        }
    }
}
