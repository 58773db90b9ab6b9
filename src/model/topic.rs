//! Health topic reference data
//!
//! Trending topics surfaced on the feed sidebar. No lifecycle; rows are
//! seeded or created by operators, never through the public API.

use serde::Serialize;

/// Trending health topic
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthTopic {
    pub id: i32,
    pub title: String,
    /// Mention count driving the trending order
    pub count: i32,
    pub is_active: bool,
}

/// Fields accepted when creating a health topic
#[derive(Clone, Debug)]
pub struct NewHealthTopic {
    pub title: String,
    pub count: i32,
    pub is_active: bool,
}

impl NewHealthTopic {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            count: 0,
            is_active: true,
        }
    }

    pub fn with_count(title: impl Into<String>, count: i32) -> Self {
        Self {
            title: title.into(),
            count,
            is_active: true,
        }
    }
}
