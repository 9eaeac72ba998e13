use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

/// How long visit records are kept before the retention sweep removes
/// them. `Never` disables the sweep entirely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AutoDeletePeriod {
    Never,
    Days7,
    Days30,
    Days90,
    Days180,
    Days365,
}

impl AutoDeletePeriod {
    pub fn retention(&self) -> Option<Duration> {
        match self {
            AutoDeletePeriod::Never => None,
            AutoDeletePeriod::Days7 => Some(Duration::days(7)),
            AutoDeletePeriod::Days30 => Some(Duration::days(30)),
            AutoDeletePeriod::Days90 => Some(Duration::days(90)),
            AutoDeletePeriod::Days180 => Some(Duration::days(180)),
            AutoDeletePeriod::Days365 => Some(Duration::days(365)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSettings {
    pub enabled: bool,
    /// Sampling cadence in minutes. Must stay positive; callers own the
    /// legal range.
    pub update_interval_minutes: u32,
    pub auto_delete_period: AutoDeletePeriod,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            update_interval_minutes: 15,
            auto_delete_period: AutoDeletePeriod::Never,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<TrackingSettings>,
}

impl SettingsStore {
    /// Opens the store, creating and persisting defaults when no
    /// settings file exists yet.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            let defaults = TrackingSettings::default();
            persist(&path, &defaults)?;
            defaults
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> TrackingSettings {
        self.data.read().unwrap().clone()
    }

    /// Durably writes the new settings. In-memory state only changes
    /// once the disk write has succeeded.
    pub fn save(&self, settings: TrackingSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        persist(&self.path, &settings)?;
        *guard = settings;
        Ok(())
    }
}

fn persist(path: &PathBuf, data: &TrackingSettings) -> Result<()> {
    let serialized = serde_json::to_string_pretty(data)?;
    fs::write(path, serialized)
        .with_context(|| format!("Failed to write settings to {}", path.display()))
}
