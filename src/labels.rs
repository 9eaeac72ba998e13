use std::collections::HashMap;

use anyhow::Result;

use crate::db::{Database, PlaceLabel};
use crate::geo::CoordinateCell;

/// User-assigned place names keyed by quantized coordinate cell.
/// Independent of visit records: clearing or expiring history never
/// touches labels, and the aggregator never creates one.
pub struct LabelStore {
    db: Database,
}

impl LabelStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Assign or remove the label for the cell containing the given
    /// coordinates. `None` removes an existing association.
    pub async fn set(&self, latitude: f64, longitude: f64, text: Option<String>) -> Result<()> {
        let key = CoordinateCell::containing(latitude, longitude).key();
        match text {
            Some(text) => self.db.upsert_label(&key, &text).await,
            None => self.db.delete_label(&key).await,
        }
    }

    /// Resolve the label for a coordinate: the containing cell wins,
    /// then the 8 adjacent cells.
    pub async fn lookup(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let cell = CoordinateCell::containing(latitude, longitude);
        if let Some(text) = self.db.get_label(&cell.key()).await? {
            return Ok(Some(text));
        }
        for neighbour in cell.neighbours() {
            if let Some(text) = self.db.get_label(&neighbour.key()).await? {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }

    pub async fn all(&self) -> Result<Vec<PlaceLabel>> {
        self.db.get_labels().await
    }
}

/// Same resolution as [`LabelStore::lookup`], against a preloaded map.
/// Used when merging labels onto a whole history load.
pub(crate) fn label_in_map(
    labels: &HashMap<String, String>,
    latitude: f64,
    longitude: f64,
) -> Option<String> {
    let cell = CoordinateCell::containing(latitude, longitude);
    if let Some(text) = labels.get(&cell.key()) {
        return Some(text.clone());
    }
    cell.neighbours()
        .iter()
        .find_map(|neighbour| labels.get(&neighbour.key()).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_cell_wins_over_neighbours() {
        let mut labels = HashMap::new();
        let cell = CoordinateCell::containing(10.0, 20.0);
        labels.insert(cell.key(), "Home".to_string());
        labels.insert(cell.neighbours()[0].key(), "Next door".to_string());

        assert_eq!(label_in_map(&labels, 10.0, 20.0).as_deref(), Some("Home"));
    }

    #[test]
    fn adjacent_cell_inherits_the_label() {
        let mut labels = HashMap::new();
        labels.insert(CoordinateCell::containing(10.0, 20.0).key(), "Gym".to_string());

        // One cell over (~11 m north).
        assert_eq!(
            label_in_map(&labels, 10.0001, 20.0).as_deref(),
            Some("Gym")
        );
    }

    #[test]
    fn unlabeled_coordinates_resolve_to_none() {
        let labels = HashMap::new();
        assert_eq!(label_in_map(&labels, 10.0, 20.0), None);
    }
}
