//! Named and explicit date ranges for querying and clearing history.
//!
//! All boundaries are computed in local time. Ranges include their start
//! boundary; whether the end is included depends on the timeframe
//! (`yesterday` stops just short of today's midnight).

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Timeframe {
    Today,
    Yesterday,
    Week,
    Month,
    Custom,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub include_end: bool,
}

impl TimeRange {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        if timestamp < self.start {
            return false;
        }
        if self.include_end {
            timestamp <= self.end
        } else {
            timestamp < self.end
        }
    }
}

/// A timeframe resolved against a concrete "now".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedTimeframe {
    /// Every record matches (`Timeframe::All`).
    Unbounded,
    Range(TimeRange),
    /// Nothing matches. Malformed custom bounds land here instead of
    /// failing, so bad user input filters to an empty result.
    Empty,
}

pub(crate) fn resolve(
    timeframe: Timeframe,
    start_date: Option<&str>,
    end_date: Option<&str>,
    now: DateTime<Local>,
) -> ResolvedTimeframe {
    let now_utc = now.with_timezone(&Utc);

    match timeframe {
        Timeframe::All => ResolvedTimeframe::Unbounded,
        Timeframe::Today => match start_of_day(now.date_naive()) {
            Some(start) => range(start, now_utc, true),
            None => ResolvedTimeframe::Empty,
        },
        Timeframe::Yesterday => {
            let today = now.date_naive();
            let start = today.pred_opt().and_then(start_of_day);
            let end = start_of_day(today);
            match (start, end) {
                (Some(start), Some(end)) => range(start, end, false),
                _ => ResolvedTimeframe::Empty,
            }
        }
        Timeframe::Week => range(now_utc - Duration::days(7), now_utc, true),
        Timeframe::Month => range(now_utc - Duration::days(30), now_utc, true),
        Timeframe::Custom => {
            let start = parse_date(start_date).and_then(start_of_day);
            let end = parse_date(end_date).and_then(end_of_day);
            match (start, end) {
                (Some(start), Some(end)) => range(start, end, true),
                _ => ResolvedTimeframe::Empty,
            }
        }
    }
}

fn range(start: DateTime<Utc>, end: DateTime<Utc>, include_end: bool) -> ResolvedTimeframe {
    ResolvedTimeframe::Range(TimeRange {
        start,
        end,
        include_end,
    })
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?, DATE_FORMAT).ok()
}

fn start_of_day(day: NaiveDate) -> Option<DateTime<Utc>> {
    let naive = day.and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn end_of_day(day: NaiveDate) -> Option<DateTime<Utc>> {
    let naive = day.and_hms_opt(23, 59, 59)?;
    Local
        .from_local_datetime(&naive)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
}
