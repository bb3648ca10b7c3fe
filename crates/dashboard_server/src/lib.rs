//! HTTP server variant of the bubble dashboard.
//!
//! The server owns one source per registered block, keeps the last good payload of each in
//! memory and refreshes them on their own cadence. Browsers read the JSON API and subscribe to
//! `/events`, a Server-Sent-Events stream of `{"block": id, "data": ...}` updates.
//!
//! | Endpoint | Response |
//! |---|---|
//! | `GET /api/status` | `{"status": "ok", "cached_blocks": [...]}` |
//! | `GET /api/blocks` | block catalog |
//! | `GET /api/{id}` | `{"ok": true, "data": ...}`, 404 for unknown ids, 500 when the fetch fails |
//! | `GET /events` | SSE `update` events, cached entries first |

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod cache;
mod error;
pub mod events;
mod http;
pub mod scheduler;
pub mod settings;
mod state;

use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub use error::ServerError;
pub use settings::ServerArgs;
pub use state::{LookupError, RefreshOutcome, ServerState};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);

/// A bound, not yet running server.
#[derive(Debug)]
pub struct DashboardServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl DashboardServer {
    /// Binds `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] when the address is unavailable.
    pub fn bind(addr: &str, state: ServerState) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        Ok(Self {
            listener,
            state: Arc::new(state),
        })
    }

    /// Address the listener is bound to.
    ///
    /// # Errors
    ///
    /// Returns the socket error when the address cannot be queried.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared state, for callers that want to inspect the cache.
    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Starts the refresh scheduler and serves connections until `shutdown` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] when the listener cannot be switched to non-blocking mode or
    /// the scheduler thread cannot be started.
    pub fn run(self, shutdown: Arc<AtomicBool>) -> Result<(), ServerError> {
        self.listener.set_nonblocking(true)?;

        let scheduler_state = Arc::clone(&self.state);
        let scheduler_shutdown = Arc::clone(&shutdown);
        let scheduler = thread::Builder::new()
            .name("refresh-scheduler".to_string())
            .spawn(move || scheduler::run_scheduler(scheduler_state, scheduler_shutdown))?;

        while !shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    let state = Arc::clone(&self.state);
                    let shutdown = Arc::clone(&shutdown);
                    let spawned = thread::Builder::new()
                        .name("http-conn".to_string())
                        .spawn(move || {
                            if let Err(err) = http::handle_connection(stream, &state, &shutdown) {
                                tracing::debug!(%peer, error = %err, "connection closed with error");
                            }
                        });
                    if let Err(err) = spawned {
                        tracing::error!(error = %err, "failed to spawn connection thread");
                    }
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_BACKOFF);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "accept failed");
                }
            }
        }

        if scheduler.join().is_err() {
            tracing::error!("refresh scheduler panicked");
        }
        tracing::info!("dashboard server stopped");
        Ok(())
    }
}

/// Loads settings, binds the listener and serves until the process exits.
///
/// # Errors
///
/// Returns the first startup failure: unreadable settings, a registry conflict or a busy port.
pub fn run(args: &ServerArgs) -> Result<(), ServerError> {
    let mut config = settings::load_config(args.config.as_deref())?;
    let applied = settings::apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    if !applied.is_empty() {
        tracing::info!(vars = ?applied, "applied environment overrides");
    }

    let registry = block_registry::builtin_registry()?;
    let state = ServerState::new(registry, &config);
    let server = DashboardServer::bind(&args.bind_addr(), state)?;
    let addr = server.local_addr()?;
    tracing::info!(%addr, "dashboard server listening");

    server.run(Arc::new(AtomicBool::new(false)))
}
