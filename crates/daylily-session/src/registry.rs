use crate::clock::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Sliding expiration window applied when no timeout is given (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(1800);

/// Thread-safe registry of live session identifiers.
///
/// Maps each session id to the instant it was last created or refreshed.
/// Every operation takes the same lock for its whole critical section and
/// never awaits or performs I/O while holding it.
#[derive(Debug, Clone)]
pub struct SessionRegistry<C = SystemClock> {
    sessions: Arc<Mutex<HashMap<String, Instant>>>,
    timeout: Duration,
    clock: C,
}

impl SessionRegistry<SystemClock> {
    /// Creates an empty registry with [`DEFAULT_SESSION_TIMEOUT`].
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_SESSION_TIMEOUT)
    }

    /// Creates an empty registry with a custom expiration window.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_clock(timeout, SystemClock)
    }
}

impl Default for SessionRegistry<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SessionRegistry<C> {
    /// Creates an empty registry that reads time from `clock`.
    pub fn with_clock(timeout: Duration, clock: C) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            timeout,
            clock,
        }
    }

    /// The sliding expiration window.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // Every write is a single insert/remove/retain, so the map is
                // consistent even if a holder panicked.
                tracing::error!("session registry lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Registers a new session and returns its identifier.
    pub fn create(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        let now = self.clock.now();
        self.lock().insert(session_id.clone(), now);
        tracing::info!(session_id = %session_id, "session created");
        session_id
    }

    /// Refreshes `session_id` if it is still live.
    ///
    /// Returns `false` when the session is unknown or has expired; an expired
    /// entry is removed as a side effect. The two cases are not distinguished.
    pub fn touch(&self, session_id: &str) -> bool {
        let mut sessions = self.lock();
        let now = self.clock.now();

        let Some(last_access) = sessions.get_mut(session_id) else {
            return false;
        };

        if now.duration_since(*last_access) < self.timeout {
            *last_access = now;
            tracing::info!(session_id, "session used");
            true
        } else {
            sessions.remove(session_id);
            tracing::info!(session_id, "session expired");
            false
        }
    }

    /// Returns `candidate` if it names a live session, otherwise a new id.
    ///
    /// `None` and the empty string always yield a fresh session.
    pub fn get_or_create(&self, candidate: Option<&str>) -> String {
        match candidate {
            Some(id) if !id.is_empty() && self.touch(id) => id.to_string(),
            _ => self.create(),
        }
    }

    /// Removes every session whose last access is at least one timeout old.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup(&self) -> usize {
        let mut sessions = self.lock();
        let now = self.clock.now();
        let timeout = self.timeout;
        let before = sessions.len();

        sessions.retain(|session_id, last_access| {
            let live = now.duration_since(*last_access) < timeout;
            if !live {
                tracing::info!(session_id = %session_id, "session expired (cleanup)");
            }
            live
        });

        before - sessions.len()
    }

    /// Number of tracked sessions, including expired ones not yet evicted.
    pub fn active_count(&self) -> usize {
        self.lock().len()
    }
}
