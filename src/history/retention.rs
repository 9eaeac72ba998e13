use anyhow::Result;
use chrono::{DateTime, Utc};
use log::info;

use crate::db::Database;
use crate::settings::AutoDeletePeriod;

pub fn retention_cutoff(
    period: AutoDeletePeriod,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    period.retention().map(|kept| now - kept)
}

/// Delete visits older than the configured retention period. Runs on
/// every history load; a second pass right after the first deletes
/// nothing. Labels are a separate store and are never touched.
pub async fn sweep_expired(db: &Database, period: AutoDeletePeriod) -> Result<usize> {
    let Some(cutoff) = retention_cutoff(period, Utc::now()) else {
        return Ok(0);
    };

    let deleted = db.delete_visits_before(cutoff).await?;
    if deleted > 0 {
        info!("Retention sweep removed {deleted} visit(s) started before {cutoff}");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn never_has_no_cutoff() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        assert_eq!(retention_cutoff(AutoDeletePeriod::Never, now), None);
    }

    #[test]
    fn cutoff_trails_now_by_the_period() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        assert_eq!(
            retention_cutoff(AutoDeletePeriod::Days7, now),
            Some(now - Duration::days(7))
        );
        assert_eq!(
            retention_cutoff(AutoDeletePeriod::Days365, now),
            Some(now - Duration::days(365))
        );
    }
}
