//! Per-user session tracking with whole-event locking.

use std::sync::Arc;

use indexmap::IndexMap;
use quiz_core::SessionState;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Default maximum number of users to track before LRU eviction.
const DEFAULT_MAX_USERS: usize = 10000;

/// Per-user conversation sessions with LRU eviction.
///
/// Each user's state sits behind its own lock; [`checkout`] hands the
/// caller an owned guard that serializes all handling for that user
/// while other users proceed in parallel.
///
/// To keep traffic from many unique senders from growing the map
/// without bound, the least recently used sessions are evicted once the
/// cap is reached. An evicted user simply starts over from
/// [`SessionState::Idle`]: language selection is one message away and
/// scores live in the database, so nothing of value is lost.
///
/// [`checkout`]: SessionMap::checkout
#[derive(Debug)]
pub struct SessionMap {
    /// Map from user id to their session slot.
    /// Uses IndexMap to maintain access order for LRU eviction.
    sessions: Mutex<IndexMap<String, Arc<Mutex<SessionState>>>>,
    /// Maximum number of users to track before LRU eviction.
    max_users: usize,
}

impl Default for SessionMap {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_USERS)
    }
}

impl SessionMap {
    /// Create a session map with a custom user cap.
    pub fn new(max_users: usize) -> Self {
        Self {
            sessions: Mutex::new(IndexMap::new()),
            max_users,
        }
    }

    /// Lock the session for a user, creating it in `Idle` if unseen.
    ///
    /// The returned guard serializes event handling for this user; hold
    /// it for the whole event, store calls included. Marks the user as
    /// recently used.
    pub async fn checkout(&self, user_id: &str) -> OwnedMutexGuard<SessionState> {
        let slot = {
            let mut sessions = self.sessions.lock().await;

            // Remove and re-insert to move to the end (mark as recently used).
            let slot = match sessions.shift_remove(user_id) {
                Some(slot) => slot,
                None => Arc::new(Mutex::new(SessionState::Idle)),
            };
            sessions.insert(user_id.to_string(), slot.clone());

            // LRU eviction: drop the oldest entries over the cap. An
            // in-flight holder keeps its state alive through the Arc.
            while sessions.len() > self.max_users {
                sessions.shift_remove_index(0);
            }

            slot
        };

        slot.lock_owned().await
    }

    /// Number of users currently tracked.
    pub async fn user_count(&self) -> usize {
        let sessions = self.sessions.lock().await;
        sessions.len()
    }
}
