//! Local content server lifecycle: bundle versioning, extraction, and
//! session-scoped server handles whose origin is republished to a view.

mod asset_store;
mod coordinator;
mod coordinator_options;
mod error;
mod extractor;
mod fs_asset_store;
mod server_config;
mod server_handle;
mod server_state;
mod session;
mod state_emitter;
mod state_event;
mod version_checker;
mod view;

#[cfg(test)]
mod tests;

pub use asset_store::AssetStore;
pub use coordinator::LifecycleCoordinator;
pub use coordinator_options::CoordinatorOptions;
pub use error::{AssetError, AssetResult, ServerError, ServerResult, UnknownState};
pub use extractor::AssetExtractor;
pub use fs_asset_store::FsAssetStore;
pub use server_config::{ServerConfig, UrlAlias};
pub use server_handle::{ServerFactory, ServerHandle, next_server_id};
pub use server_state::{STATES, ServerState, StateEntry};
pub use session::{PrepareOutcome, Session, SessionId, Visibility};
pub use state_emitter::StateEmitter;
pub use state_event::StateEvent;
pub use version_checker::{VersionCheck, VersionChecker};
pub use view::{ViewBinding, ViewSource, bind_view};
