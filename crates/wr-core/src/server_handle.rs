use crate::{ServerConfig, ServerResult, ServerState, StateEvent};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;

static NEXT_SERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate the next server identity. Identities increase monotonically for
/// the lifetime of the process.
pub fn next_server_id() -> u64 {
    NEXT_SERVER_ID.fetch_add(1, Ordering::Relaxed)
}

/// A file server the coordinator can drive.
///
/// Implementations run independently of the coordinator and report every
/// transition on the channel returned by [`ServerHandle::subscribe`].
#[async_trait]
pub trait ServerHandle: Send + Sync {
    fn id(&self) -> u64;

    fn state(&self) -> ServerState;

    /// Resolved origin while listening.
    fn origin(&self) -> Option<String>;

    fn subscribe(&self) -> broadcast::Receiver<StateEvent>;

    /// Resolves with the origin once the handle is `Active`.
    async fn start(&self) -> ServerResult<String>;

    async fn stop(&self) -> ServerResult<()>;
}

/// Creates one handle per session.
pub trait ServerFactory: Send + Sync {
    fn create(&self, config: ServerConfig) -> Arc<dyn ServerHandle>;
}
