//! Transition bookkeeping for server handle implementations.

use crate::{ServerError, ServerResult, ServerState, StateEvent};

use std::fmt::Display;
use std::sync::{Mutex, PoisonError};

use log::debug;
use tokio::sync::broadcast;

const EVENT_BUFFER: usize = 32;

/// Holds a handle's current state and broadcasts every legal transition.
pub struct StateEmitter {
    server_id: u64,
    current: Mutex<ServerState>,
    tx: broadcast::Sender<StateEvent>,
}

impl StateEmitter {
    pub fn new(server_id: u64) -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            server_id,
            current: Mutex::new(ServerState::Stopped),
            tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> ServerState {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to `next` and notify subscribers.
    ///
    /// Illegal edges are rejected and nothing is emitted.
    pub fn transition(&self, next: ServerState, details: impl Into<String>) -> ServerResult<()> {
        self.emit(StateEvent::new(self.server_id, next, details))
    }

    /// Move to `Crashed`, attaching the failure to the event.
    pub fn crash(&self, details: impl Into<String>, error: &impl Display) -> ServerResult<()> {
        self.emit(
            StateEvent::new(self.server_id, ServerState::Crashed, details)
                .with_error(error.to_string()),
        )
    }

    fn emit(&self, event: StateEvent) -> ServerResult<()> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if !current.can_transition_to(event.state) {
            return Err(ServerError::invalid_transition(*current, event.state));
        }
        *current = event.state;

        debug!(
            "Server #{}: {} ({})",
            self.server_id, event.state, event.details
        );
        // No subscribers is fine
        let _ = self.tx.send(event);
        Ok(())
    }
}
