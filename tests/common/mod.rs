#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use placelog::{Database, LocationProvider, PermissionManager, Ping, Visit};

/// Provider stub that always reports the same coordinates with good
/// accuracy.
pub struct FixedProvider {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationProvider for FixedProvider {
    fn current_fix(&self) -> Result<Ping> {
        Ok(Ping {
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy_m: 5.0,
            timestamp: Utc::now(),
        })
    }
}

pub struct Grant(pub AtomicBool);

impl Grant {
    pub fn granted() -> Arc<Self> {
        Arc::new(Self(AtomicBool::new(true)))
    }

    pub fn denied() -> Arc<Self> {
        Arc::new(Self(AtomicBool::new(false)))
    }

    pub fn set(&self, granted: bool) {
        self.0.store(granted, Ordering::SeqCst);
    }
}

impl PermissionManager for Grant {
    fn has_location_grant(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Reads RUST_LOG; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .is_test(true)
        .try_init();
}

pub fn temp_data_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("placelog-{tag}-{}", uuid::Uuid::new_v4()))
}

pub fn visit_at(
    latitude: f64,
    longitude: f64,
    started_at: DateTime<Utc>,
    duration_secs: i64,
) -> Visit {
    Visit {
        id: uuid::Uuid::new_v4().to_string(),
        latitude,
        longitude,
        started_at,
        ended_at: if duration_secs > 0 {
            Some(started_at + Duration::seconds(duration_secs))
        } else {
            None
        },
        created_at: started_at,
        updated_at: started_at,
    }
}

/// Seed visit records through a second handle onto the same database
/// file the engine uses.
pub async fn seed_visits(data_dir: &Path, visits: &[Visit]) -> Result<()> {
    let db = Database::new(data_dir.join("placelog.sqlite3"))?;
    for visit in visits {
        db.insert_visit(visit).await?;
    }
    Ok(())
}
