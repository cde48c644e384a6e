use crate::ServerState;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One notification from a server handle's state channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateEvent {
    pub server_id: u64,
    pub state: ServerState,
    pub details: String,
    /// Present when the transition was caused by a failure
    pub error: Option<String>,
    pub at: DateTime<Utc>,
}

impl StateEvent {
    pub fn new(server_id: u64, state: ServerState, details: impl Into<String>) -> Self {
        Self {
            server_id,
            state,
            details: details.into(),
            error: None,
            at: Utc::now(),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub const fn ordinal(&self) -> u8 {
        self.state.ordinal()
    }
}
