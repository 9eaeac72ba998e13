//! Visit data models.
//!
//! A visit is an aggregated stay at one place, built from one or more
//! location fixes that fall within the merge radius of each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted visit record. `ended_at` stays NULL until a second fix at
/// the same place extends the stay, so an open or single-sample visit
/// has a duration of zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Visit {
    pub fn duration_ms(&self) -> i64 {
        self.ended_at
            .map(|ended| (ended - self.started_at).num_milliseconds().max(0))
            .unwrap_or(0)
    }

    pub fn end_timestamp(&self) -> DateTime<Utc> {
        self.ended_at.unwrap_or(self.started_at)
    }
}

/// Read model handed to callers: the visit plus the place label merged
/// in from the label store at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitInfo {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
    pub duration_ms: i64,
    pub label: Option<String>,
}

impl VisitInfo {
    pub fn from_visit(visit: &Visit, label: Option<String>) -> Self {
        Self {
            id: visit.id.clone(),
            latitude: visit.latitude,
            longitude: visit.longitude,
            timestamp: visit.started_at,
            end_timestamp: visit.end_timestamp(),
            duration_ms: visit.duration_ms(),
            label,
        }
    }
}
