use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::parse_datetime,
    models::PlaceLabel,
};

fn row_to_label(row: &Row) -> Result<PlaceLabel> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(PlaceLabel {
        cell_key: row.get("cell_key")?,
        text: row.get("text")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    /// Insert or replace the label for a coordinate cell.
    pub async fn upsert_label(&self, cell_key: &str, text: &str) -> Result<()> {
        let cell_key = cell_key.to_string();
        let text = text.to_string();
        self.execute(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO labels (cell_key, text, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(cell_key) DO UPDATE SET
                     text = excluded.text,
                     updated_at = excluded.updated_at",
                params![cell_key, text, now.to_rfc3339(), now.to_rfc3339()],
            )?;
            Ok(())
        })
        .await
    }

    /// Remove a cell's label. Removing a label that was never set is not
    /// an error.
    pub async fn delete_label(&self, cell_key: &str) -> Result<()> {
        let cell_key = cell_key.to_string();
        self.execute(move |conn| {
            conn.execute("DELETE FROM labels WHERE cell_key = ?1", params![cell_key])?;
            Ok(())
        })
        .await
    }

    pub async fn get_label(&self, cell_key: &str) -> Result<Option<String>> {
        let cell_key = cell_key.to_string();
        self.execute(move |conn| {
            let text = conn
                .query_row(
                    "SELECT text FROM labels WHERE cell_key = ?1",
                    params![cell_key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(text)
        })
        .await
    }

    pub async fn get_labels(&self) -> Result<Vec<PlaceLabel>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT cell_key, text, created_at, updated_at
                 FROM labels
                 ORDER BY created_at ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut labels = Vec::new();
            while let Some(row) = rows.next()? {
                labels.push(row_to_label(row)?);
            }

            Ok(labels)
        })
        .await
    }
}
