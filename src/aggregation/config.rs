/// Configuration for the ping-to-visit aggregation with tunable thresholds.
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// Maximum distance between a new fix and the open visit for them
    /// to count as the same stay. Inclusive at the boundary.
    pub merge_radius_m: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            merge_radius_m: 75.0,
        }
    }
}
