use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use flip_core::model::SessionId;

use crate::Clock;
use crate::error::SessionError;
use super::service::QuizSession;
use super::view::{SessionAction, SessionView};

/// Idle time after which a session may be purged.
pub const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 60;

struct Slot {
    session: QuizSession,
    last_active: DateTime<Utc>,
}

/// Live sessions keyed by id.
///
/// Each session sits behind its own lock, so actions on one session never wait
/// for another. The map lock is only held to look a session up.
#[derive(Clone)]
pub struct SessionRegistry {
    clock: Clock,
    idle_timeout: Duration,
    sessions: Arc<RwLock<HashMap<SessionId, Arc<Mutex<Slot>>>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            idle_timeout: Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Register a started session and return its id.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LockPoisoned` if the registry lock is poisoned.
    pub fn insert(&self, session: QuizSession) -> Result<SessionId, SessionError> {
        let id = session.id();
        let slot = Slot {
            session,
            last_active: self.clock.now(),
        };
        self.sessions
            .write()
            .map_err(|_| SessionError::LockPoisoned)?
            .insert(id, Arc::new(Mutex::new(slot)));
        debug!(session = %id, "registered session");
        Ok(id)
    }

    /// Run `f` against one session, marking it active.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownSession` if `id` is not registered.
    pub fn with_session<R>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut QuizSession) -> R,
    ) -> Result<R, SessionError> {
        let slot = self
            .sessions
            .read()
            .map_err(|_| SessionError::LockPoisoned)?
            .get(&id)
            .cloned()
            .ok_or(SessionError::UnknownSession(id))?;

        let mut slot = slot.lock().map_err(|_| SessionError::LockPoisoned)?;
        slot.last_active = self.clock.now();
        Ok(f(&mut slot.session))
    }

    /// Dispatch an action to one session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownSession` for unknown ids and otherwise the
    /// action's own error.
    pub fn apply(&self, id: SessionId, action: SessionAction) -> Result<SessionView, SessionError> {
        self.with_session(id, |session| session.apply(action))?
    }

    /// Current view of one session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownSession` if `id` is not registered.
    pub fn view(&self, id: SessionId) -> Result<SessionView, SessionError> {
        self.with_session(id, |session| session.view())
    }

    /// Stop a session and drop its state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownSession` if `id` is not registered.
    pub fn remove(&self, id: SessionId) -> Result<(), SessionError> {
        self.sessions
            .write()
            .map_err(|_| SessionError::LockPoisoned)?
            .remove(&id)
            .map(|_| debug!(session = %id, "removed session"))
            .ok_or(SessionError::UnknownSession(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().map(|map| map.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions idle for longer than the timeout, as of now.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LockPoisoned` if the registry lock is poisoned.
    pub fn purge_expired(&self) -> Result<usize, SessionError> {
        self.purge_expired_at(self.clock.now())
    }

    /// Drop sessions idle for longer than the timeout at `now`.
    ///
    /// Sessions busy in another thread are kept.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LockPoisoned` if the registry lock is poisoned.
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<usize, SessionError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::LockPoisoned)?;
        let before = sessions.len();
        sessions.retain(|_, slot| match slot.try_lock() {
            Ok(slot) => now - slot.last_active <= self.idle_timeout,
            Err(_) => true,
        });
        let purged = before - sessions.len();
        if purged > 0 {
            debug!(purged, remaining = sessions.len(), "purged idle sessions");
        }
        Ok(purged)
    }
}
