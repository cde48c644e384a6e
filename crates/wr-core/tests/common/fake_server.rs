#![allow(dead_code)]

use wr_core::{
    ServerConfig, ServerError, ServerFactory, ServerHandle, ServerResult, ServerState,
    StateEmitter, StateEvent, next_server_id,
};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, oneshot};

/// Base port handed out when the config asks for an ephemeral one
const EPHEMERAL_BASE: u16 = 40000;

/// How a fake start should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    /// Report CRASHED on the state channel, then return the error
    Crash,
    /// Wind back to STOPPED without reporting an error event
    Silent,
    /// Return the error while still STARTING
    Abandon,
}

/// In-memory server handle driven by a [`StateEmitter`].
pub struct FakeServer {
    id: u64,
    config: ServerConfig,
    emitter: StateEmitter,
    origin: Mutex<Option<String>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    fail: Option<FailMode>,
    lifecycle: tokio::sync::Mutex<()>,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl FakeServer {
    pub fn new(
        config: ServerConfig,
        gate: Option<oneshot::Receiver<()>>,
        fail: Option<FailMode>,
    ) -> Self {
        let id = next_server_id();
        Self {
            id,
            config,
            emitter: StateEmitter::new(id),
            origin: Mutex::new(None),
            gate: Mutex::new(gate),
            fail,
            lifecycle: tokio::sync::Mutex::new(()),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Emit a transition as if it came from the engine.
    pub fn emit(&self, state: ServerState, details: &str) -> ServerResult<()> {
        if state == ServerState::Active {
            *self.origin.lock().unwrap() = Some(self.resolved_origin());
        } else if state.invalidates_origin() {
            *self.origin.lock().unwrap() = None;
        }
        self.emitter.transition(state, details)
    }

    pub fn resolved_origin(&self) -> String {
        let port = if self.config.is_ephemeral_port() {
            EPHEMERAL_BASE + (self.id % 1000) as u16
        } else {
            self.config.port
        };
        format!("http://{}:{port}", self.config.hostname)
    }
}

#[async_trait]
impl ServerHandle for FakeServer {
    fn id(&self) -> u64 {
        self.id
    }

    fn state(&self) -> ServerState {
        self.emitter.state()
    }

    fn origin(&self) -> Option<String> {
        self.origin.lock().unwrap().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.emitter.subscribe()
    }

    /// Start and stop are serialized: a stop issued while a start is pending
    /// runs once the start has finished.
    async fn start(&self) -> ServerResult<String> {
        let _lifecycle = self.lifecycle.lock().await;
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.emitter.transition(ServerState::Starting, "starting")?;

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match self.fail {
            Some(FailMode::Crash) => {
                let error = ServerError::startup_failed("address already in use");
                self.emitter.crash("bind failed", &error)?;
                Err(error)
            }
            Some(FailMode::Silent) => {
                self.emitter.transition(ServerState::Stopping, "giving up")?;
                self.emitter.transition(ServerState::Stopped, "gave up")?;
                Err(ServerError::startup_failed("engine refused the config"))
            }
            Some(FailMode::Abandon) => Err(ServerError::startup_failed("engine gave up")),
            None => {
                let origin = self.resolved_origin();
                *self.origin.lock().unwrap() = Some(origin.clone());
                self.emitter.transition(ServerState::Active, "listening")?;
                Ok(origin)
            }
        }
    }

    async fn stop(&self) -> ServerResult<()> {
        let _lifecycle = self.lifecycle.lock().await;
        self.stops.fetch_add(1, Ordering::SeqCst);
        match self.emitter.state() {
            ServerState::Stopped => return Ok(()),
            ServerState::Crashed => {}
            _ => self.emitter.transition(ServerState::Stopping, "stopping")?,
        }
        *self.origin.lock().unwrap() = None;
        self.emitter.transition(ServerState::Stopped, "stopped")
    }
}

#[derive(Default)]
struct NextStart {
    gate: Option<oneshot::Receiver<()>>,
    fail: Option<FailMode>,
}

/// Factory that records every server it creates.
#[derive(Default)]
pub struct FakeFactory {
    created: Mutex<Vec<Arc<FakeServer>>>,
    next: Mutex<NextStart>,
}

impl FakeFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The next created server blocks in `start` until the sender fires or
    /// is dropped.
    pub fn gate_next_start(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.next.lock().unwrap().gate = Some(rx);
        tx
    }

    pub fn fail_next_start(&self, mode: FailMode) {
        self.next.lock().unwrap().fail = Some(mode);
    }

    pub fn created(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn last(&self) -> Arc<FakeServer> {
        self.created
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no server created yet")
    }
}

impl ServerFactory for FakeFactory {
    fn create(&self, config: ServerConfig) -> Arc<dyn ServerHandle> {
        let next = std::mem::take(&mut *self.next.lock().unwrap());
        let server = Arc::new(FakeServer::new(config, next.gate, next.fail));
        self.created.lock().unwrap().push(server.clone());
        server
    }
}

/// Poll until `condition` holds or fail the test.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 2s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Receive events until one matches.
pub async fn next_event(
    rx: &mut broadcast::Receiver<StateEvent>,
    mut matches: impl FnMut(&StateEvent) -> bool,
) -> StateEvent {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = rx.recv().await.expect("state channel closed");
            if matches(&event) {
                return event;
            }
        }
    })
    .await
    .expect("no matching state event within 2s")
}
