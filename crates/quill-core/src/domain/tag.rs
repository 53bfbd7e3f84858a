use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag entity - a flat label shared across posts. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
