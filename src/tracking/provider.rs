//! Collaborator seams for the platform's location stack. The engine
//! never talks to an OS API directly; hosts inject these.

use anyhow::Result;
use chrono::{DateTime, Utc};

/// One raw location sample. Ephemeral: consumed by the aggregator and
/// never persisted as-is.
#[derive(Debug, Clone)]
pub struct Ping {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
    pub timestamp: DateTime<Utc>,
}

/// Source of raw coordinate fixes. Called from a blocking worker, so
/// implementations may block while acquiring a fix.
pub trait LocationProvider: Send + Sync {
    fn current_fix(&self) -> Result<Ping>;
}

/// Reports whether the user has granted both foreground and background
/// location access. Obtaining the grant is the host's problem.
pub trait PermissionManager: Send + Sync {
    fn has_location_grant(&self) -> bool;
}
