use geo::{Distance, Haversine, Point};

/// Cells are ~10 m on a side at this scale (1e-4 degrees of latitude).
const CELL_SCALE: f64 = 1e4;

/// Great-circle distance between two coordinates, in meters.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let from = Point::new(lon1, lat1);
    let to = Point::new(lon2, lat2);
    Haversine::distance(from, to)
}

/// A coordinate snapped to a fixed-precision grid cell. Cells give
/// labels a stable lookup key: any fix landing in the same (or an
/// adjacent) cell resolves to the same place name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordinateCell {
    lat_cell: i64,
    lon_cell: i64,
}

impl CoordinateCell {
    pub fn containing(latitude: f64, longitude: f64) -> Self {
        Self {
            lat_cell: (latitude * CELL_SCALE).round() as i64,
            lon_cell: (longitude * CELL_SCALE).round() as i64,
        }
    }

    pub fn key(&self) -> String {
        format!("{}:{}", self.lat_cell, self.lon_cell)
    }

    /// The 8 surrounding cells, excluding this one.
    pub fn neighbours(&self) -> Vec<CoordinateCell> {
        let mut cells = Vec::with_capacity(8);
        for dlat in -1..=1i64 {
            for dlon in -1..=1i64 {
                if dlat == 0 && dlon == 0 {
                    continue;
                }
                cells.push(CoordinateCell {
                    lat_cell: self.lat_cell + dlat,
                    lon_cell: self.lon_cell + dlon,
                });
            }
        }
        cells
    }
}
