mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{temp_data_dir, FixedProvider, Grant};
use placelog::{LocationHistory, TrackingSettings, TrackingState};

fn enabled_settings() -> TrackingSettings {
    TrackingSettings {
        enabled: true,
        ..TrackingSettings::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn start_without_permission_is_refused() -> anyhow::Result<()> {
    common::init_logging();
    let provider = Arc::new(FixedProvider {
        latitude: 51.5074,
        longitude: -0.1278,
    });
    let engine = LocationHistory::new(temp_data_dir("no-grant"), provider, Grant::denied())?;

    engine.save_settings(enabled_settings()).await?;

    assert!(!engine.start_tracking().await?);
    assert!(!engine.is_tracking_active().await);
    // The engine never silently reverts what the caller configured.
    assert!(engine.get_settings().enabled);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn redundant_start_leaves_exactly_one_sampler() -> anyhow::Result<()> {
    common::init_logging();
    let provider = Arc::new(FixedProvider {
        latitude: 51.5074,
        longitude: -0.1278,
    });
    let engine = LocationHistory::new(temp_data_dir("idempotent"), provider, Grant::granted())?;

    engine.save_settings(enabled_settings()).await?;

    assert!(engine.start_tracking().await?);
    assert!(engine.start_tracking().await?);
    assert!(engine.is_tracking_active().await);

    // Give the (single) loop its first immediate tick, then stop.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(engine.stop_tracking().await);
    assert!(!engine.is_tracking_active().await);
    assert!(!engine.stop_tracking().await);

    // Two live samplers would each have opened a visit from the same fix.
    let history = engine.get_history().await?;
    assert_eq!(history.len(), 1);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn sampling_records_a_visit_at_the_fix() -> anyhow::Result<()> {
    common::init_logging();
    let provider = Arc::new(FixedProvider {
        latitude: 48.8584,
        longitude: 2.2945,
    });
    let engine = LocationHistory::new(temp_data_dir("sampling"), provider, Grant::granted())?;

    engine.save_settings(enabled_settings()).await?;
    assert!(engine.start_tracking().await?);
    tokio::time::sleep(Duration::from_millis(400)).await;
    engine.stop_tracking().await;

    let history = engine.get_history().await?;
    assert_eq!(history.len(), 1);

    let visit = &history[0];
    assert!((visit.latitude - 48.8584).abs() < 1e-9);
    assert!((visit.longitude - 2.2945).abs() < 1e-9);
    assert_eq!(visit.duration_ms, 0);
    assert_eq!(visit.label, None);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn tracking_state_reflects_grant_and_registration() -> anyhow::Result<()> {
    common::init_logging();
    let provider = Arc::new(FixedProvider {
        latitude: 51.5074,
        longitude: -0.1278,
    });
    let permissions = Grant::denied();
    let engine = LocationHistory::new(
        temp_data_dir("state"),
        provider,
        permissions.clone(),
    )?;

    assert_eq!(engine.tracking_state().await, TrackingState::Inactive);

    engine.save_settings(enabled_settings()).await?;
    assert_eq!(
        engine.tracking_state().await,
        TrackingState::PermissionDenied
    );

    permissions.set(true);
    assert!(engine.start_tracking().await?);
    assert_eq!(engine.tracking_state().await, TrackingState::Active);

    engine.stop_tracking().await;
    assert_eq!(engine.tracking_state().await, TrackingState::Inactive);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn interval_change_while_active_restarts_the_sampler() -> anyhow::Result<()> {
    common::init_logging();
    let provider = Arc::new(FixedProvider {
        latitude: 51.5074,
        longitude: -0.1278,
    });
    let engine = LocationHistory::new(temp_data_dir("interval"), provider, Grant::granted())?;

    engine.save_settings(enabled_settings()).await?;
    assert!(engine.start_tracking().await?);

    engine.update_interval(5).await?;
    assert!(engine.is_tracking_active().await);
    assert_eq!(engine.get_settings().update_interval_minutes, 5);

    engine.stop_tracking().await;

    // Inactive: the new value only sticks in settings.
    engine.update_interval(45).await?;
    assert!(!engine.is_tracking_active().await);
    assert_eq!(engine.get_settings().update_interval_minutes, 45);

    Ok(())
}
