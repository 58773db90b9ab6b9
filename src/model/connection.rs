//! Connection records: directed follow/connect edges between users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::ApiError;

/// Lifecycle state of a connection request
///
/// `pending` is only ever set by a request; `accepted` and `rejected` are
/// the recipient's decisions. A rejected edge can be re-requested, which
/// moves it back to `pending`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
            ConnectionStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConnectionStatus::Pending),
            "accepted" => Ok(ConnectionStatus::Accepted),
            "rejected" => Ok(ConnectionStatus::Rejected),
            other => Err(ApiError::BadRequest(format!(
                "Unknown connection status: {}",
                other
            ))),
        }
    }
}

/// Directed follow/connect edge
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: i32,
    pub follower_id: i32,
    pub following_id: i32,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a connection; status always starts pending
#[derive(Clone, Debug)]
pub struct NewConnection {
    pub follower_id: i32,
    pub following_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ConnectionStatus::Pending,
            ConnectionStatus::Accepted,
            ConnectionStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ConnectionStatus>().unwrap(), status);
        }
        assert!("blocked".parse::<ConnectionStatus>().is_err());
    }
}
