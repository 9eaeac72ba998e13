//! Ping-to-visit aggregation.
//!
//! Raw location fixes are compressed into one record per distinct stay:
//! a fix within the merge radius of the open visit extends it, a fix
//! outside closes it and opens a new one. Storing one record per fix
//! would grow without bound and tell the user nothing about how long
//! they stayed anywhere.

use uuid::Uuid;

use crate::aggregation::config::AggregationConfig;
use crate::db::models::Visit;
use crate::geo::distance_meters;
use crate::tracking::Ping;

/// What happened to the visit state after one fix. The caller is
/// responsible for persisting each transition; the tracker itself never
/// touches storage.
#[derive(Debug, Clone)]
pub enum VisitTransition {
    /// No visit was open; this fix opened one.
    Started(Visit),
    /// The fix fell inside the merge radius of the open visit.
    Extended(Visit),
    /// The fix fell outside the merge radius: the previous visit is
    /// final, and a new one opened at the fix's coordinates.
    Relocated { closed: Visit, opened: Visit },
}

/// Turns a stream of accepted fixes into visit transitions. Holds only
/// the one open visit; fixes must arrive in non-decreasing timestamp
/// order from a single caller.
pub struct VisitTracker {
    config: AggregationConfig,
    current: Option<Visit>,
}

impl VisitTracker {
    pub fn new(config: AggregationConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Visit> {
        self.current.as_ref()
    }

    /// Drop the open visit so the next fix starts fresh. Used after a
    /// persistence failure left storage behind the in-memory state.
    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn observe(&mut self, ping: &Ping) -> VisitTransition {
        match self.current.take() {
            None => {
                let opened = open_visit(ping);
                self.current = Some(opened.clone());
                VisitTransition::Started(opened)
            }
            Some(mut current) => {
                let distance = distance_meters(
                    current.latitude,
                    current.longitude,
                    ping.latitude,
                    ping.longitude,
                );

                if distance <= self.config.merge_radius_m {
                    current.ended_at = Some(ping.timestamp);
                    current.updated_at = ping.timestamp;
                    self.current = Some(current.clone());
                    VisitTransition::Extended(current)
                } else {
                    let closed = finalize_visit(current);
                    let opened = open_visit(ping);
                    self.current = Some(opened.clone());
                    VisitTransition::Relocated { closed, opened }
                }
            }
        }
    }
}

fn open_visit(ping: &Ping) -> Visit {
    Visit {
        id: Uuid::new_v4().to_string(),
        latitude: ping.latitude,
        longitude: ping.longitude,
        started_at: ping.timestamp,
        ended_at: None,
        created_at: ping.timestamp,
        updated_at: ping.timestamp,
    }
}

/// A single-sample visit never saw an extending fix; its stay collapses
/// to a zero-duration point at `started_at`.
fn finalize_visit(mut visit: Visit) -> Visit {
    if visit.ended_at.is_none() {
        visit.ended_at = Some(visit.started_at);
    }
    visit
}
