//! One mount cycle of a server handle.

use crate::{
    AssetExtractor, ServerConfig, ServerHandle, ServerState, StateEvent, VersionCheck,
    VersionChecker,
};

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

const EVENT_BUFFER: usize = 32;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

type HandleSlot = Arc<Mutex<Option<Arc<dyn ServerHandle>>>>;

/// Process-unique session identity. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareOutcome {
    /// The package store is served directly
    Skipped,
    UpToDate,
    Extracted,
    /// Extraction failed; the start is still attempted
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Foreground,
    Background,
}

/// Owns one server handle from creation to disposal.
///
/// Clones share the same session. The published origin is `None` until the
/// owned handle is `Active`, and is cleared as soon as the handle stops,
/// crashes, or the session is disposed. Dropping the last clone disposes.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    id: SessionId,
    server_id: u64,
    config: ServerConfig,
    bundle: String,
    require_extraction: bool,
    checker: VersionChecker,
    extractor: AssetExtractor,
    owned: HandleSlot,
    origin_tx: Arc<watch::Sender<Option<String>>>,
    events_tx: broadcast::Sender<StateEvent>,
    failures_tx: mpsc::UnboundedSender<StateEvent>,
    failures_rx: Mutex<Option<mpsc::UnboundedReceiver<StateEvent>>>,
    observer: Mutex<Option<JoinHandle<()>>>,
    suspended: AtomicBool,
}

impl Session {
    pub(crate) fn new(
        config: ServerConfig,
        handle: Arc<dyn ServerHandle>,
        bundle: String,
        require_extraction: bool,
        checker: VersionChecker,
        extractor: AssetExtractor,
    ) -> Self {
        let (origin_tx, _) = watch::channel(None);
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);
        let (failures_tx, failures_rx) = mpsc::unbounded_channel();

        Self {
            inner: Arc::new(SessionInner {
                id: SessionId::next(),
                server_id: handle.id(),
                config,
                bundle,
                require_extraction,
                checker,
                extractor,
                owned: Arc::new(Mutex::new(Some(handle))),
                origin_tx: Arc::new(origin_tx),
                events_tx,
                failures_tx,
                failures_rx: Mutex::new(Some(failures_rx)),
                observer: Mutex::new(None),
                suspended: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    pub fn server_id(&self) -> u64 {
        self.inner.server_id
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Currently published origin.
    pub fn origin(&self) -> Option<String> {
        self.inner.origin_tx.borrow().clone()
    }

    /// Follow the published origin. The channel closes once the session is
    /// gone.
    pub fn watch_origin(&self) -> watch::Receiver<Option<String>> {
        self.inner.origin_tx.subscribe()
    }

    /// State events of the owned handle, forwarded after the session has
    /// applied them, plus start failures the handle did not report itself.
    pub fn subscribe_states(&self) -> broadcast::Receiver<StateEvent> {
        self.inner.events_tx.subscribe()
    }

    pub fn is_disposed(&self) -> bool {
        lock(&self.inner.owned).is_none()
    }

    /// Prepare, then start unless disposed in the meantime.
    pub async fn run(&self) -> Option<String> {
        let outcome = self.prepare().await;
        debug!("Session {} prepared: {outcome:?}", self.inner.id);

        if self.is_disposed() {
            info!(
                "Session {} disposed during prepare, not starting",
                self.inner.id
            );
            return None;
        }

        self.start().await
    }

    /// Make sure the served directory holds the current bundle.
    ///
    /// Never fails: problems are logged and reported in the outcome.
    pub async fn prepare(&self) -> PrepareOutcome {
        let inner = &self.inner;
        if !inner.require_extraction {
            debug!(
                "Session {}: serving {} in place",
                inner.id,
                inner.config.file_dir.display()
            );
            return PrepareOutcome::Skipped;
        }

        let dest = &inner.config.file_dir;
        if let VersionCheck::UpToDate = inner.checker.check(&inner.bundle, dest).await {
            return PrepareOutcome::UpToDate;
        }

        info!("Extracting web server assets...");
        match inner.extractor.extract(&inner.bundle, dest).await {
            Ok(()) => PrepareOutcome::Extracted,
            Err(e) => {
                error!("Session {}: {e}", inner.id);
                PrepareOutcome::Failed(e.to_string())
            }
        }
    }

    /// Subscribe to the owned handle and start it.
    ///
    /// Returns the origin only if it was published, i.e. the session still
    /// owned the same handle when the start resolved.
    pub async fn start(&self) -> Option<String> {
        let Some(handle) = self.owned_handle() else {
            debug!("Session {} is disposed, not starting", self.inner.id);
            return None;
        };

        self.ensure_observer(&handle);
        self.inner.suspended.store(false, Ordering::SeqCst);

        match handle.start().await {
            Ok(origin) => {
                if self.publish_if_owned(handle.id(), Some(origin.clone())) {
                    info!("Session {}: serving at {origin}", self.inner.id);
                    Some(origin)
                } else {
                    debug!(
                        "Session {}: server #{} started after dispose, ignoring",
                        self.inner.id,
                        handle.id()
                    );
                    None
                }
            }
            Err(e) => {
                error!(
                    "Session {}: server #{} failed to start: {e}",
                    self.inner.id,
                    handle.id()
                );
                self.surface_start_failure(handle.as_ref(), &e.to_string());
                None
            }
        }
    }

    /// Apply the background-suspend policy.
    ///
    /// With `stop_in_background`, going to the background stops an active
    /// server and clears the origin; coming back restarts it.
    pub async fn set_visibility(&self, visibility: Visibility) {
        if !self.inner.config.stop_in_background {
            return;
        }
        let Some(handle) = self.owned_handle() else {
            return;
        };

        match visibility {
            Visibility::Background => {
                if handle.state() != ServerState::Active {
                    return;
                }
                info!(
                    "Session {}: suspending server #{} in background",
                    self.inner.id,
                    handle.id()
                );
                self.inner.suspended.store(true, Ordering::SeqCst);
                self.publish_if_owned(handle.id(), None);
                if let Err(e) = handle.stop().await {
                    warn!("Session {}: failed to suspend: {e}", self.inner.id);
                }
            }
            Visibility::Foreground => {
                if !self.inner.suspended.load(Ordering::SeqCst) {
                    return;
                }
                info!(
                    "Session {}: resuming server #{}",
                    self.inner.id,
                    handle.id()
                );
                self.start().await;
            }
        }
    }

    /// Release the handle and clear the origin right away.
    ///
    /// Stopping the server continues on a background task; the returned
    /// join handle can be awaited but does not need to be. Disposing twice
    /// is a no-op.
    pub fn dispose(&self) -> Option<JoinHandle<()>> {
        self.inner.dispose()
    }

    fn owned_handle(&self) -> Option<Arc<dyn ServerHandle>> {
        lock(&self.inner.owned).clone()
    }

    /// Publish under the ownership lock so dispose cannot interleave.
    fn publish_if_owned(&self, server_id: u64, origin: Option<String>) -> bool {
        let slot = lock(&self.inner.owned);
        match slot.as_ref() {
            Some(handle) if handle.id() == server_id => {
                self.inner.origin_tx.send_replace(origin);
                true
            }
            _ => false,
        }
    }

    fn ensure_observer(&self, handle: &Arc<dyn ServerHandle>) {
        let mut observer = lock(&self.inner.observer);
        if observer.is_some() || self.is_disposed() {
            return;
        }
        let Some(failures) = lock(&self.inner.failures_rx).take() else {
            return;
        };

        *observer = Some(tokio::spawn(observe(
            handle.subscribe(),
            failures,
            self.inner.owned.clone(),
            self.inner.origin_tx.clone(),
            self.inner.events_tx.clone(),
            self.inner.id,
        )));
    }

    /// Handles that crash report it themselves; anything else gets a
    /// synthesized terminal event so the failure reaches subscribers.
    ///
    /// The event goes through the observer, after every event the handle
    /// emitted before `start` returned.
    fn surface_start_failure(&self, handle: &dyn ServerHandle, error: &str) {
        let state = match handle.state() {
            ServerState::Crashed => return,
            ServerState::Stopped => ServerState::Stopped,
            _ => ServerState::Crashed,
        };
        if self.is_disposed() {
            return;
        }

        let event = StateEvent::new(handle.id(), state, "start failed").with_error(error);
        if self.inner.failures_tx.send(event).is_err() {
            debug!("Session {}: observer gone, start failure not forwarded", self.inner.id);
        }
    }
}

impl SessionInner {
    fn dispose(&self) -> Option<JoinHandle<()>> {
        let handle = lock(&self.owned).take();
        self.origin_tx.send_replace(None);

        if let Some(observer) = lock(&self.observer).take() {
            observer.abort();
        }

        let handle = handle?;
        info!("Disposing session {} (server #{})", self.id, handle.id());

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let session = self.id;
                Some(runtime.spawn(async move {
                    match handle.stop().await {
                        Ok(()) => debug!("Session {session}: server #{} stopped", handle.id()),
                        Err(e) => warn!(
                            "Session {session}: failed to stop server #{}: {e}",
                            handle.id()
                        ),
                    }
                }))
            }
            Err(_) => {
                warn!(
                    "No async runtime available, server #{} was not stopped",
                    handle.id()
                );
                None
            }
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("server_id", &self.inner.server_id)
            .field("origin", &self.origin())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Apply a handle's state events, then synthesized start failures, to the
/// session.
///
/// Handle events are drained first so a failure is never forwarded ahead of
/// the transitions that led to it. Events from a handle the session no
/// longer owns are dropped.
async fn observe(
    mut rx: broadcast::Receiver<StateEvent>,
    mut failures: mpsc::UnboundedReceiver<StateEvent>,
    owned: HandleSlot,
    origin_tx: Arc<watch::Sender<Option<String>>>,
    events_tx: broadcast::Sender<StateEvent>,
    session: SessionId,
) {
    let mut handle_closed = false;

    loop {
        let event = tokio::select! {
            biased;
            received = rx.recv(), if !handle_closed => match received {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Session {session}: missed {skipped} server state events");
                    continue;
                }
                Err(RecvError::Closed) => {
                    handle_closed = true;
                    continue;
                }
            },
            Some(event) = failures.recv() => event,
            else => break,
        };

        if apply_event(&event, &owned, &origin_tx, session) {
            let _ = events_tx.send(event);
        }
    }
}

/// Update the published origin from one event. Returns false when the event
/// belongs to a handle the session no longer owns.
fn apply_event(
    event: &StateEvent,
    owned: &HandleSlot,
    origin_tx: &watch::Sender<Option<String>>,
    session: SessionId,
) -> bool {
    let slot = lock(owned);
    let Some(handle) = slot.as_ref().filter(|h| h.id() == event.server_id) else {
        debug!(
            "Session {session}: ignoring {} from server #{}",
            event.state, event.server_id
        );
        return false;
    };

    info!(
        "Server #{}. Origin: {}. New state: \"{}\". Details: \"{}\".",
        event.server_id,
        handle.origin().as_deref().unwrap_or("none"),
        event.state,
        event.details
    );
    if let Some(ref error) = event.error {
        error!("Server #{}: {error}", event.server_id);
    }

    if event.state.invalidates_origin() {
        origin_tx.send_replace(None);
    } else if event.state == ServerState::Active
        && let Some(origin) = handle.origin()
    {
        origin_tx.send_replace(Some(origin));
    }

    true
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
