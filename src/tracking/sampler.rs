use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::aggregation::{AggregationConfig, VisitTracker, VisitTransition};
use crate::db::Database;
use crate::geo::distance_meters;
use crate::settings::SettingsStore;
use crate::tracking::provider::LocationProvider;

/// Fixes less accurate than this are too imprecise to trust.
const MAX_ACCURACY_M: f64 = 100.0;
/// Fixes closer than this to the last delivered one are suppressed, so
/// a stationary device does not hammer the store with identical pings.
const MIN_DISTANCE_M: f64 = 10.0;
const FIX_TIMEOUT_SECS: u64 = 30;

pub(crate) async fn sampling_loop(
    interval_minutes: u32,
    db: Database,
    settings: Arc<SettingsStore>,
    provider: Arc<dyn LocationProvider>,
    config: AggregationConfig,
    cancel_token: CancellationToken,
) {
    let period = Duration::from_secs(u64::from(interval_minutes.max(1)) * 60);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut tracker = VisitTracker::new(config);
    let mut last_delivered: Option<(f64, f64)> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Settings can flip underneath us; a disabled sampler
                // must take itself down rather than keep running.
                if !settings.get().enabled {
                    info!("Tracking disabled in settings; sampling loop stopping itself");
                    cancel_token.cancel();
                    break;
                }

                let fut = sample_once(&db, provider.clone(), &mut tracker, &mut last_delivered);
                match tokio::time::timeout(Duration::from_secs(FIX_TIMEOUT_SECS), fut).await {
                    Ok(Ok(())) => {},
                    Ok(Err(err)) => error!("location sample failed: {err:?}"),
                    Err(_) => warn!("location sample timeout (> {FIX_TIMEOUT_SECS}s)"),
                }
            }
            _ = cancel_token.cancelled() => {
                info!("sampling loop shutting down");
                break;
            }
        }
    }
}

async fn sample_once(
    db: &Database,
    provider: Arc<dyn LocationProvider>,
    tracker: &mut VisitTracker,
    last_delivered: &mut Option<(f64, f64)>,
) -> Result<()> {
    let fix = tokio::task::spawn_blocking(move || provider.current_fix())
        .await
        .context("location fix worker join failed")?
        .map_err(|err| anyhow!("location fix failed: {err}"))?;

    if fix.accuracy_m > MAX_ACCURACY_M {
        info!(
            "Discarding low-accuracy fix ({:.0}m > {MAX_ACCURACY_M}m)",
            fix.accuracy_m
        );
        return Ok(());
    }

    if let Some((lat, lon)) = *last_delivered {
        let moved = distance_meters(lat, lon, fix.latitude, fix.longitude);
        if moved < MIN_DISTANCE_M {
            debug!("Suppressing fix {moved:.1}m from the last delivered sample");
            return Ok(());
        }
    }

    let transition = tracker.observe(&fix);
    if let Err(err) = persist_transition(db, &transition).await {
        // Storage is now behind the tracker; forget the open visit so
        // the next fix starts a fresh record instead of extending one
        // that was never written.
        tracker.reset();
        return Err(err);
    }

    *last_delivered = Some((fix.latitude, fix.longitude));
    Ok(())
}

async fn persist_transition(db: &Database, transition: &VisitTransition) -> Result<()> {
    match transition {
        VisitTransition::Started(visit) => {
            db.insert_visit(visit)
                .await
                .context("failed to persist new visit")?;
            info!(
                "Started visit {} at ({:.5}, {:.5})",
                visit.id, visit.latitude, visit.longitude
            );
        }
        VisitTransition::Extended(visit) => {
            db.set_visit_end(&visit.id, visit.end_timestamp(), visit.updated_at)
                .await
                .context("failed to extend visit")?;
        }
        VisitTransition::Relocated { closed, opened } => {
            db.set_visit_end(&closed.id, closed.end_timestamp(), closed.updated_at)
                .await
                .context("failed to close visit")?;
            db.insert_visit(opened)
                .await
                .context("failed to persist new visit")?;
            info!(
                "Closed visit {} after {}ms, started visit {} at ({:.5}, {:.5})",
                closed.id,
                closed.duration_ms(),
                opened.id,
                opened.latitude,
                opened.longitude
            );
        }
    }
    Ok(())
}
