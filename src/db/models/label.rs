use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-assigned place name, keyed by a quantized coordinate cell.
/// Labels live independently of visit records: clearing or expiring
/// history never removes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceLabel {
    pub cell_key: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
