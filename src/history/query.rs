use chrono::{DateTime, Local};

use crate::db::models::VisitInfo;
use crate::history::timeframe::{resolve, ResolvedTimeframe, Timeframe};

/// Select the visits whose start falls inside the timeframe. Preserves
/// the input's ordering, never mutates it, and treats malformed custom
/// bounds as an empty result.
pub fn filter_by_timeframe(
    visits: &[VisitInfo],
    timeframe: Timeframe,
    start_date: Option<&str>,
    end_date: Option<&str>,
    now: DateTime<Local>,
) -> Vec<VisitInfo> {
    match resolve(timeframe, start_date, end_date, now) {
        ResolvedTimeframe::Unbounded => visits.to_vec(),
        ResolvedTimeframe::Empty => Vec::new(),
        ResolvedTimeframe::Range(range) => visits
            .iter()
            .filter(|visit| range.contains(visit.timestamp))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn midnight_of(now: DateTime<Local>) -> DateTime<Utc> {
        let naive = now.date_naive().and_hms_opt(0, 0, 0).unwrap();
        Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn visit_at(id: &str, timestamp: DateTime<Utc>) -> VisitInfo {
        VisitInfo {
            id: id.to_string(),
            latitude: 10.0,
            longitude: 20.0,
            timestamp,
            end_timestamp: timestamp,
            duration_ms: 0,
            label: None,
        }
    }

    fn ids(visits: &[VisitInfo]) -> Vec<&str> {
        visits.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn today_keeps_boundary_timestamps() {
        let now = Local::now();
        let now_utc = now.with_timezone(&Utc);
        let midnight = midnight_of(now);

        let visits = vec![
            visit_at("before", midnight - Duration::seconds(1)),
            visit_at("at-midnight", midnight),
            visit_at("morning", midnight + Duration::hours(3)),
            visit_at("at-now", now_utc),
        ];

        let filtered = filter_by_timeframe(&visits, Timeframe::Today, None, None, now);
        assert_eq!(ids(&filtered), vec!["at-midnight", "morning", "at-now"]);
    }

    #[test]
    fn order_of_the_input_is_preserved() {
        let now = Local::now();
        let now_utc = now.with_timezone(&Utc);

        let visits: Vec<VisitInfo> = (0..5)
            .map(|i| visit_at(&format!("v{i}"), now_utc - Duration::minutes(50 - i * 10)))
            .collect();

        let filtered = filter_by_timeframe(&visits, Timeframe::Week, None, None, now);
        assert_eq!(ids(&filtered), vec!["v0", "v1", "v2", "v3", "v4"]);
        // Recomputable: the input is untouched.
        assert_eq!(visits.len(), 5);
    }

    #[test]
    fn malformed_custom_dates_filter_everything_out() {
        let now = Local::now();
        let visits = vec![visit_at("v", now.with_timezone(&Utc))];

        let filtered =
            filter_by_timeframe(&visits, Timeframe::Custom, Some("2024-99-99"), Some("x"), now);
        assert!(filtered.is_empty());
    }

    #[test]
    fn all_returns_every_visit() {
        let now = Local::now();
        let old = now.with_timezone(&Utc) - Duration::days(400);
        let visits = vec![visit_at("ancient", old), visit_at("recent", now.with_timezone(&Utc))];

        let filtered = filter_by_timeframe(&visits, Timeframe::All, None, None, now);
        assert_eq!(filtered.len(), 2);
    }
}
