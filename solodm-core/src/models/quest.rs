use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids;

/// A quest record: generated id, creation timestamp, and whatever fields the
/// caller supplied. The quest collection is append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl Quest {
    pub fn new(attrs: Map<String, Value>) -> Self {
        Self {
            id: ids::generate_id(),
            created_at: Utc::now(),
            attrs,
        }
    }
}
