use crate::UnknownState;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a server handle.
///
/// Each state has a stable numeric ordinal and an upper-case label, and the
/// two map onto each other both ways for consumers on the other side of a
/// process or language boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ServerState {
    /// Listening; the origin is resolvable
    Active = 0,
    /// Failed while starting or while active
    Crashed = 1,
    /// Not running
    Stopped = 2,
    /// Bringing the listener up
    Starting = 3,
    /// Shutting the listener down
    Stopping = 4,
}

/// Every state, indexed by ordinal.
pub const STATES: [ServerState; 5] = [
    ServerState::Active,
    ServerState::Crashed,
    ServerState::Stopped,
    ServerState::Starting,
    ServerState::Stopping,
];

/// One row of the ordinal <-> label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateEntry {
    pub ordinal: u8,
    pub label: &'static str,
}

impl ServerState {
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Crashed => "CRASHED",
            Self::Stopped => "STOPPED",
            Self::Starting => "STARTING",
            Self::Stopping => "STOPPING",
        }
    }

    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Active),
            1 => Some(Self::Crashed),
            2 => Some(Self::Stopped),
            3 => Some(Self::Starting),
            4 => Some(Self::Stopping),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        STATES
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }

    /// The full ordinal <-> label table, in ordinal order.
    pub fn table() -> Vec<StateEntry> {
        STATES
            .into_iter()
            .map(|s| StateEntry {
                ordinal: s.ordinal(),
                label: s.label(),
            })
            .collect()
    }

    /// States after which a previously published origin is no longer valid.
    pub const fn invalidates_origin(self) -> bool {
        matches!(self, Self::Stopping | Self::Stopped | Self::Crashed)
    }

    /// Legal edges of the lifecycle graph.
    ///
    /// `Stopped -> Starting -> Active -> Stopping -> Stopped`, plus `Crashed`
    /// from `Starting`/`Active`, stop during start, and restart or cleanup
    /// after a crash.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Stopped, Self::Starting)
                | (Self::Starting, Self::Active)
                | (Self::Starting, Self::Crashed)
                | (Self::Starting, Self::Stopping)
                | (Self::Active, Self::Stopping)
                | (Self::Active, Self::Crashed)
                | (Self::Stopping, Self::Stopped)
                | (Self::Crashed, Self::Starting)
                | (Self::Crashed, Self::Stopped)
        )
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ServerState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownState(s.to_string()))
    }
}

impl TryFrom<u8> for ServerState {
    type Error = UnknownState;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(ordinal).ok_or_else(|| UnknownState(ordinal.to_string()))
    }
}

impl From<ServerState> for u8 {
    fn from(state: ServerState) -> Self {
        state.ordinal()
    }
}
