use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_optional_datetime},
    models::Visit,
};

fn row_to_visit(row: &Row) -> Result<Visit> {
    let started_at: String = row.get("started_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Visit {
        id: row.get("id")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_optional_datetime(ended_at, "ended_at")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    pub async fn insert_visit(&self, visit: &Visit) -> Result<()> {
        let record = visit.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO visits (id, latitude, longitude, started_at, ended_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    record.latitude,
                    record.longitude,
                    record.started_at.to_rfc3339(),
                    record
                        .ended_at
                        .as_ref()
                        .map(|dt| dt.to_rfc3339()),
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn set_visit_end(
        &self,
        visit_id: &str,
        ended_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let visit_id = visit_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE visits
                 SET ended_at = ?1,
                     updated_at = ?2
                 WHERE id = ?3",
                params![ended_at.to_rfc3339(), updated_at.to_rfc3339(), visit_id,],
            )?;
            Ok(())
        })
        .await
    }

    /// Close open visits left behind by a killed process. An open visit
    /// never saw a second fix, so its stay collapses to a zero-duration
    /// point at `started_at`.
    pub async fn finalize_stale_open_visits(&self, now: DateTime<Utc>) -> Result<usize> {
        self.execute(move |conn| {
            let affected = conn.execute(
                "UPDATE visits
                 SET ended_at = started_at,
                     updated_at = ?1
                 WHERE ended_at IS NULL",
                params![now.to_rfc3339()],
            )?;
            Ok(affected)
        })
        .await
    }

    pub async fn get_visits(&self) -> Result<Vec<Visit>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, latitude, longitude, started_at, ended_at, created_at, updated_at
                 FROM visits
                 ORDER BY started_at ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut visits = Vec::new();
            while let Some(row) = rows.next()? {
                visits.push(row_to_visit(row)?);
            }

            Ok(visits)
        })
        .await
    }

    pub async fn delete_visits_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        include_end: bool,
    ) -> Result<usize> {
        self.execute(move |conn| {
            let query = if include_end {
                "DELETE FROM visits WHERE started_at >= ?1 AND started_at <= ?2"
            } else {
                "DELETE FROM visits WHERE started_at >= ?1 AND started_at < ?2"
            };
            let affected = conn.execute(query, params![start.to_rfc3339(), end.to_rfc3339()])?;
            Ok(affected)
        })
        .await
    }

    pub async fn delete_visits_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.execute(move |conn| {
            let affected = conn.execute(
                "DELETE FROM visits WHERE started_at < ?1",
                params![cutoff.to_rfc3339()],
            )?;
            Ok(affected)
        })
        .await
    }

    pub async fn delete_all_visits(&self) -> Result<usize> {
        self.execute(|conn| {
            let affected = conn.execute("DELETE FROM visits", [])?;
            Ok(affected)
        })
        .await
    }
}
