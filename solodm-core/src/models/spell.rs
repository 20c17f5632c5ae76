use serde::{Deserialize, Serialize};

/// Static spell reference data, seeded once at startup and read-only after.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub id: String,
    pub name: String,
    pub level: u8,
    pub school: String,
    pub casting_time: String,
    pub range: String,
    pub components: String,
    pub duration: String,
    pub description: String,
    pub ritual: bool,
    pub concentration: bool,
}
