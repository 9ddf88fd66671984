//! In-memory session store.
//!
//! Sessions are process-local and never persisted. The store hands a
//! session out by value for the duration of one message cycle and takes
//! it back afterwards, so no lock is ever held across a backend await.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::session::Session;

pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Remove and return the session for `key`, creating a fresh one on
    /// first use. The caller must hand it back via [`restore`] once the
    /// message cycle completes.
    ///
    /// [`restore`]: SessionStore::restore
    pub fn take(&self, key: &str) -> Session {
        let mut sessions = self.sessions.lock();
        match sessions.remove(key) {
            Some(session) => session,
            None => {
                tracing::debug!(session_key = key, "creating new session");
                Session::new(key)
            }
        }
    }

    /// Hand a session back after a message cycle.
    pub fn restore(&self, session: Session) {
        let mut sessions = self.sessions.lock();
        sessions.insert(session.session_key.clone(), session);
    }

    /// Discard any existing session for `key`; the next [`take`] starts
    /// over with empty history and no collected identity.
    ///
    /// [`take`]: SessionStore::take
    pub fn reset(&self, key: &str) {
        let mut sessions = self.sessions.lock();
        if sessions.remove(key).is_some() {
            tracing::info!(session_key = key, "session reset");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
