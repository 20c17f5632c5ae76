use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids;

/// A player character. Only `id` and `createdAt` are fixed; everything else
/// (name, class, level, ability scores, hit points, ...) is caller-supplied
/// and carried verbatim in the flattened attribute map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl Character {
    pub fn new(attrs: Map<String, Value>) -> Self {
        Self {
            id: ids::generate_id(),
            created_at: Utc::now(),
            attrs,
        }
    }

    /// Render an attribute for display in the DM context line.
    /// Missing or non-scalar attributes render as "?".
    pub fn attr_display(&self, key: &str) -> String {
        match self.attrs.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "?".to_string(),
        }
    }
}
