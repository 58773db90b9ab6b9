//! Cookie session management
//!
//! Tracks logged-in users in memory. Each successful login mints an opaque
//! session id which travels back to the client in an HttpOnly cookie; every
//! authenticated request resolves the cookie back to a user id here.

use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info};

/// An authenticated session for one logged-in user
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Opaque session id, also the cookie value
    pub session_id: String,

    /// Id of the user this session belongs to
    pub user_id: i32,

    /// Session creation timestamp (unix seconds)
    pub created_at: u64,

    /// Session expiry timestamp (unix seconds), pushed forward on each access
    pub expires_at: u64,

    /// Last activity timestamp (unix seconds)
    pub last_activity: u64,
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl Session {
    fn new(session_id: String, user_id: i32, ttl_seconds: u64) -> Self {
        let now = unix_now();
        Self {
            session_id,
            user_id,
            created_at: now,
            expires_at: now + ttl_seconds,
            last_activity: now,
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        unix_now() >= self.expires_at
    }

    /// Push expiry forward after activity
    fn touch(&mut self, ttl_seconds: u64) {
        let now = unix_now();
        self.last_activity = now;
        self.expires_at = now + ttl_seconds;
    }

    /// Remaining session time in seconds
    pub fn remaining_seconds(&self) -> u64 {
        self.expires_at.saturating_sub(unix_now())
    }
}

/// In-memory session store with expiration
pub struct SessionStore {
    /// Active sessions by session id
    sessions: DashMap<String, Session>,

    /// Session TTL, refreshed on every validated access
    ttl: Duration,

    /// Last cleanup timestamp
    last_cleanup: std::sync::atomic::AtomicU64,
}

impl SessionStore {
    /// Create a new session store
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::from_secs(ttl_seconds),
            last_cleanup: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Create a fresh session for a user
    ///
    /// Each login gets its own session, so the same user can stay signed in
    /// from more than one client at a time.
    pub fn create(&self, user_id: i32) -> Session {
        let session_id = format!("sess_{}", uuid::Uuid::new_v4());
        let session = Session::new(session_id.clone(), user_id, self.ttl.as_secs());

        self.sessions.insert(session_id, session.clone());
        debug!("Created session for user {}", user_id);

        // Periodic cleanup
        self.maybe_cleanup();

        session
    }

    /// Validate a session id and return the session, or None if invalid/expired
    ///
    /// A valid access slides the expiry forward by the full TTL.
    pub fn validate(&self, session_id: &str) -> Option<Session> {
        {
            let mut session = self.sessions.get_mut(session_id)?;
            if !session.is_expired() {
                session.touch(self.ttl.as_secs());
                return Some(session.clone());
            }
        }

        // Expired: drop the entry so the map does not accumulate dead sessions
        self.remove(session_id);
        None
    }

    /// Remove a session (logout)
    pub fn remove(&self, session_id: &str) {
        if self.sessions.remove(session_id).is_some() {
            debug!("Removed session: {}", session_id);
        }
    }

    /// Get statistics about the session store
    pub fn stats(&self) -> SessionStoreStats {
        let total = self.sessions.len();
        let expired = self.sessions.iter().filter(|s| s.is_expired()).count();

        SessionStoreStats {
            total_sessions: total,
            expired_sessions: expired,
            active_sessions: total - expired,
        }
    }

    /// Clean up expired sessions (called opportunistically from create)
    fn maybe_cleanup(&self) {
        let now = unix_now();
        let last = self.last_cleanup.load(std::sync::atomic::Ordering::Relaxed);

        // Cleanup every 5 minutes
        if now - last < 300 {
            return;
        }

        if self
            .last_cleanup
            .compare_exchange(
                last,
                now,
                std::sync::atomic::Ordering::SeqCst,
                std::sync::atomic::Ordering::Relaxed,
            )
            .is_ok()
        {
            self.cleanup();
        }
    }

    /// Force cleanup of expired sessions
    pub fn cleanup(&self) {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|s| s.is_expired())
            .map(|s| s.session_id.clone())
            .collect();

        let count = expired.len();
        for session_id in expired {
            self.remove(&session_id);
        }

        if count > 0 {
            info!("Cleaned up {} expired sessions", count);
        }
    }
}

/// Session store statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStoreStats {
    pub total_sessions: usize,
    pub expired_sessions: usize,
    pub active_sessions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let store = SessionStore::new(3600);
        let session = store.create(7);

        assert!(session.session_id.starts_with("sess_"));
        assert_eq!(session.user_id, 7);
        assert!(!session.is_expired());
        assert!(session.remaining_seconds() > 3500);
    }

    #[test]
    fn test_each_login_gets_own_session() {
        let store = SessionStore::new(3600);

        let first = store.create(1);
        let second = store.create(1);

        assert_ne!(first.session_id, second.session_id);
        assert!(store.validate(&first.session_id).is_some());
        assert!(store.validate(&second.session_id).is_some());
    }

    #[test]
    fn test_validation_and_logout() {
        let store = SessionStore::new(3600);

        let session = store.create(3);
        let validated = store.validate(&session.session_id).unwrap();
        assert_eq!(validated.user_id, 3);

        store.remove(&session.session_id);
        assert!(store.validate(&session.session_id).is_none());
    }

    #[test]
    fn test_expired_session_is_dropped() {
        let store = SessionStore::new(0);

        let session = store.create(9);
        assert!(store.validate(&session.session_id).is_none());
        assert_eq!(store.stats().total_sessions, 0);
    }

    #[test]
    fn test_cleanup_removes_expired() {
        let store = SessionStore::new(0);
        store.create(1);
        store.create(2);

        store.cleanup();
        assert_eq!(store.stats().total_sessions, 0);
    }
}
