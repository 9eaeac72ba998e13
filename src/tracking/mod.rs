pub mod provider;
pub(crate) mod sampler;
pub mod scheduler;

use serde::{Deserialize, Serialize};

pub use provider::{LocationProvider, PermissionManager, Ping};
pub use scheduler::TrackingScheduler;

/// Display state derived from settings, the scheduler's live
/// registration, and the permission grant. Never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TrackingState {
    Inactive,
    Active,
    PermissionDenied,
}
