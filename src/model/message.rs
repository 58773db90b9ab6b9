//! Direct message records
//!
//! Messages are directed sender → receiver rows; a conversation is
//! reconstructed by the caller from the two directions.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Direct message between two users
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i32,
    pub sender_id: i32,
    pub receiver_id: i32,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when sending a message; isRead always starts false
#[derive(Clone, Debug)]
pub struct NewMessage {
    pub sender_id: i32,
    pub receiver_id: i32,
    pub content: String,
}
