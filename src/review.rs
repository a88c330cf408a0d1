use serde::{Deserialize, Serialize};

/// One harvested review, as written to every export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    /// Always `YYYY/MM/DD`.
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Fields pulled from a container before the date is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReview {
    pub name: String,
    pub content: String,
    pub rate: Option<String>,
    pub date: String,
}

impl RawReview {
    pub fn into_record(self, created_at: String) -> ReviewRecord {
        ReviewRecord {
            name: self.name,
            content: self.content,
            rate: self.rate,
            created_at,
        }
    }
}
