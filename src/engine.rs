use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::sync::Mutex;

use crate::aggregation::AggregationConfig;
use crate::db::{Database, PlaceLabel, VisitInfo};
use crate::history::{filter_by_timeframe, retention, timeframe, Timeframe};
use crate::labels::{label_in_map, LabelStore};
use crate::settings::{SettingsStore, TrackingSettings};
use crate::tracking::{
    LocationProvider, PermissionManager, TrackingScheduler, TrackingState,
};

const DB_FILE: &str = "placelog.sqlite3";
const SETTINGS_FILE: &str = "settings.json";

/// The engine facade: owns the stores and the scheduler, and exposes
/// the tracking, history, and label API to hosts. Lifecycle and
/// settings mutations serialize through one mutex so an interval-change
/// restart can never race a start or stop.
pub struct LocationHistory {
    db: Database,
    settings: Arc<SettingsStore>,
    labels: LabelStore,
    scheduler: Arc<Mutex<TrackingScheduler>>,
    permissions: Arc<dyn PermissionManager>,
}

impl LocationHistory {
    pub fn new(
        data_dir: PathBuf,
        provider: Arc<dyn LocationProvider>,
        permissions: Arc<dyn PermissionManager>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let db = Database::new(data_dir.join(DB_FILE))?;
        let settings = Arc::new(SettingsStore::new(data_dir.join(SETTINGS_FILE))?);

        let scheduler = TrackingScheduler::new(
            db.clone(),
            settings.clone(),
            provider,
            permissions.clone(),
            AggregationConfig::default(),
        );

        Ok(Self {
            db: db.clone(),
            settings,
            labels: LabelStore::new(db),
            scheduler: Arc::new(Mutex::new(scheduler)),
            permissions,
        })
    }

    pub fn get_settings(&self) -> TrackingSettings {
        self.settings.get()
    }

    /// Persist new settings. An interval change reaches a running
    /// sampler before its next sample via a full stop/start.
    pub async fn save_settings(&self, settings: TrackingSettings) -> Result<()> {
        let previous = self.settings.get();
        self.settings.save(settings.clone())?;

        if settings.update_interval_minutes != previous.update_interval_minutes {
            self.scheduler
                .lock()
                .await
                .set_interval(settings.update_interval_minutes)
                .await?;
        }
        Ok(())
    }

    pub async fn update_interval(&self, minutes: u32) -> Result<()> {
        let mut settings = self.settings.get();
        settings.update_interval_minutes = minutes;
        self.save_settings(settings).await
    }

    pub async fn start_tracking(&self) -> Result<bool> {
        self.scheduler.lock().await.start().await
    }

    pub async fn stop_tracking(&self) -> bool {
        self.scheduler.lock().await.stop().await
    }

    pub async fn is_tracking_active(&self) -> bool {
        self.scheduler.lock().await.is_active()
    }

    pub async fn tracking_state(&self) -> TrackingState {
        if self.is_tracking_active().await {
            return TrackingState::Active;
        }
        if self.settings.get().enabled && !self.permissions.has_location_grant() {
            return TrackingState::PermissionDenied;
        }
        TrackingState::Inactive
    }

    /// All visits in ascending start order, labels merged in, after an
    /// opportunistic retention sweep.
    pub async fn get_history(&self) -> Result<Vec<VisitInfo>> {
        self.sweep_expired().await?;

        let visits = self.db.get_visits().await?;
        let labels: HashMap<String, String> = self
            .labels
            .all()
            .await?
            .into_iter()
            .map(|label| (label.cell_key, label.text))
            .collect();

        Ok(visits
            .iter()
            .map(|visit| {
                let label = label_in_map(&labels, visit.latitude, visit.longitude);
                VisitInfo::from_visit(visit, label)
            })
            .collect())
    }

    pub async fn filter_history(
        &self,
        timeframe: Timeframe,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<VisitInfo>> {
        let history = self.get_history().await?;
        Ok(filter_by_timeframe(
            &history,
            timeframe,
            start_date,
            end_date,
            Local::now(),
        ))
    }

    /// Delete the visits whose start falls inside the timeframe. Labels
    /// are a separate store and survive every clear. Returns the number
    /// of removed visits; malformed custom bounds clear nothing.
    pub async fn clear_history(
        &self,
        frame: Timeframe,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<usize> {
        match timeframe::resolve(frame, start_date, end_date, Local::now()) {
            timeframe::ResolvedTimeframe::Unbounded => self.db.delete_all_visits().await,
            timeframe::ResolvedTimeframe::Empty => Ok(0),
            timeframe::ResolvedTimeframe::Range(range) => {
                self.db
                    .delete_visits_between(range.start, range.end, range.include_end)
                    .await
            }
        }
    }

    pub async fn add_label(
        &self,
        latitude: f64,
        longitude: f64,
        text: Option<String>,
    ) -> Result<()> {
        self.labels.set(latitude, longitude, text).await
    }

    pub async fn get_labels(&self) -> Result<Vec<PlaceLabel>> {
        self.labels.all().await
    }

    pub async fn label_for(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        self.labels.lookup(latitude, longitude).await
    }

    pub async fn sweep_expired(&self) -> Result<usize> {
        retention::sweep_expired(&self.db, self.settings.get().auto_delete_period).await
    }
}
