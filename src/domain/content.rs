use serde::{Deserialize, Serialize};

/// Where a piece of generated copy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratedBy {
    Ai,
    Template,
}

/// Marketing copy derived from a scrape result. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub selling_points: String,
    pub script: String,
    pub rewrite: String,
    pub generated_by: GeneratedBy,
}

impl GeneratedContent {
    pub fn is_filled(&self) -> bool {
        [&self.selling_points, &self.script, &self.rewrite]
            .iter()
            .all(|s| !s.trim().is_empty())
    }
}
