//! `ServerHandle` backed by an in-process axum listener serving static files.

use crate::diagnostics::{Diagnostics, log_request};

use wr_core::{
    ServerConfig, ServerError, ServerFactory, ServerHandle, ServerResult, ServerState,
    StateEmitter, StateEvent, next_server_id,
};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::Router;
use axum::middleware::from_fn_with_state;
use log::{debug, error, info, warn};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;

pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);
const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the static file router for one server.
///
/// Aliases are mounted with `nest_service`; everything else falls through to
/// the served directory.
pub fn build_router(config: &ServerConfig) -> Router {
    let mut router = Router::new();
    for alias in &config.aliases {
        router = router.nest_service(&alias.url_prefix, ServeDir::new(&alias.directory));
    }
    router = router.fallback_service(ServeDir::new(&config.file_dir));

    if config.error_log.any_enabled() {
        let diagnostics = Diagnostics::new(
            config.error_log,
            config.aliases.iter().map(|a| a.url_prefix.clone()),
        );
        router = router.layer(from_fn_with_state(diagnostics, log_request));
    }

    router
}

struct Running {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

pub struct AxumServer {
    id: u64,
    config: ServerConfig,
    emitter: Arc<StateEmitter>,
    origin: Arc<Mutex<Option<String>>>,
    running: tokio::sync::Mutex<Option<Running>>,
    probe: reqwest::Client,
    ready_timeout: Duration,
}

impl AxumServer {
    pub fn new(config: ServerConfig, ready_timeout: Duration) -> Self {
        let id = next_server_id();
        let probe = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .pool_max_idle_per_host(1)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client for readiness probe: {e}");
                reqwest::Client::new()
            });

        Self {
            id,
            config,
            emitter: Arc::new(StateEmitter::new(id)),
            origin: Arc::new(Mutex::new(None)),
            running: tokio::sync::Mutex::new(None),
            probe,
            ready_timeout,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Host part of the origin; wildcard binds are reached over loopback.
    fn origin_host(&self) -> &str {
        match self.config.hostname.as_str() {
            "0.0.0.0" => "127.0.0.1",
            host => host,
        }
    }

    /// Poll the origin until it answers or the timeout elapses.
    async fn wait_ready(&self, origin: &str) -> ServerResult<()> {
        let start = Instant::now();

        while start.elapsed() < self.ready_timeout {
            match self.probe.get(origin).send().await {
                Ok(response) => {
                    debug!(
                        "Server #{} answered readiness probe with {}",
                        self.id,
                        response.status()
                    );
                    return Ok(());
                }
                Err(e) => debug!("Server #{} not ready yet: {e}", self.id),
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }

        Err(ServerError::startup_timeout(self.ready_timeout.as_secs()))
    }

    fn fail_start(&self, details: &str, error: ServerError) -> ServerError {
        *lock(&self.origin) = None;
        if let Err(e) = self.emitter.crash(details, &error) {
            debug!("Server #{}: could not report crash: {e}", self.id);
        }
        error
    }
}

#[async_trait]
impl ServerHandle for AxumServer {
    fn id(&self) -> u64 {
        self.id
    }

    fn state(&self) -> ServerState {
        self.emitter.state()
    }

    fn origin(&self) -> Option<String> {
        lock(&self.origin).clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.emitter.subscribe()
    }

    async fn start(&self) -> ServerResult<String> {
        let mut running = self.running.lock().await;
        if running.is_some()
            && let Some(origin) = self.origin()
        {
            return Ok(origin);
        }

        let address = self.config.bind_address();
        self.emitter
            .transition(ServerState::Starting, format!("binding {address}"))?;

        if self.config.extra_config.is_some() {
            warn!(
                "Server #{}: extra engine configuration is ignored by the built-in engine",
                self.id
            );
        }

        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => listener,
            Err(e) => return Err(self.fail_start("bind failed", ServerError::bind(&address, e))),
        };
        let local = match listener.local_addr() {
            Ok(local) => local,
            Err(e) => return Err(self.fail_start("bind failed", ServerError::from(e))),
        };
        let origin = format!("http://{}:{}", self.origin_host(), local.port());
        info!(
            "Server #{} listening on {local}, serving {}",
            self.id,
            self.config.file_dir.display()
        );

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let router = build_router(&self.config);
        let emitter = self.emitter.clone();
        let origin_slot = self.origin.clone();
        let id = self.id;
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;

            if let Err(e) = served {
                error!("Server #{id}: listener failed: {e}");
                *lock(&origin_slot) = None;
                if let Err(e) = emitter.crash("listener failed", &e) {
                    debug!("Server #{id}: could not report crash: {e}");
                }
            }
        });

        if let Err(e) = self.wait_ready(&origin).await {
            let _ = shutdown.send(());
            if tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await.is_err() {
                warn!("Server #{} did not shut down after failed start", self.id);
            }
            return Err(self.fail_start("readiness probe failed", e));
        }

        *lock(&self.origin) = Some(origin.clone());
        *running = Some(Running { shutdown, task });
        self.emitter.transition(ServerState::Active, "listening")?;

        Ok(origin)
    }

    async fn stop(&self) -> ServerResult<()> {
        let mut running = self.running.lock().await;
        let Some(Running { shutdown, mut task }) = running.take() else {
            if self.emitter.state() == ServerState::Crashed {
                self.emitter.transition(ServerState::Stopped, "cleared crash")?;
            }
            return Ok(());
        };

        if self.emitter.state() == ServerState::Active {
            self.emitter.transition(ServerState::Stopping, "shutting down")?;
        }
        *lock(&self.origin) = None;

        let _ = shutdown.send(());
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut task).await.is_err() {
            warn!(
                "Server #{} did not finish in-flight requests within {}, aborting",
                self.id,
                humantime::format_duration(SHUTDOWN_TIMEOUT)
            );
            task.abort();
        }

        self.emitter.transition(ServerState::Stopped, "stopped")?;
        info!("Server #{} stopped", self.id);

        Ok(())
    }
}

/// Creates one [`AxumServer`] per session.
pub struct AxumServerFactory {
    ready_timeout: Duration,
}

impl AxumServerFactory {
    pub fn new(ready_timeout: Duration) -> Self {
        Self { ready_timeout }
    }
}

impl Default for AxumServerFactory {
    fn default() -> Self {
        Self::new(DEFAULT_READY_TIMEOUT)
    }
}

impl ServerFactory for AxumServerFactory {
    fn create(&self, config: ServerConfig) -> Arc<dyn ServerHandle> {
        Arc::new(AxumServer::new(config, self.ready_timeout))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
