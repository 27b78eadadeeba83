/*!
 * In-memory session store.
 *
 * A mutex-guarded map from session id to session state. The store hands out
 * snapshots, never references: callers clone a session, do their (possibly
 * long-running) work without the lock, then merge the result back. The
 * merge re-checks existence so a session deleted mid-operation does not
 * reappear. Concurrent edits to the same session are last-write-wins.
 *
 * The store is unbounded; sessions live until explicitly deleted or the
 * process exits.
 */

use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::StageError;
use crate::session::models::Session;

/// Thread-safe session registry
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session and return a snapshot of it
    pub fn create(&self, subject: &str, exam_title: &str) -> Session {
        let id = Uuid::new_v4().to_string();
        let session = Session::new(id.clone(), subject.to_string(), exam_title.to_string());

        let mut sessions = self.sessions.lock();
        sessions.insert(id, session.clone());
        session
    }

    /// Snapshot of a session by id
    pub fn get(&self, session_id: &str) -> Result<Session, StageError> {
        let sessions = self.sessions.lock();
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| StageError::SessionNotFound(session_id.to_string()))
    }

    /// Merge a worked-on snapshot back into the store
    ///
    /// Fails if the session was deleted while the caller held the snapshot.
    pub fn save(&self, session: Session) -> Result<(), StageError> {
        let mut sessions = self.sessions.lock();
        if !sessions.contains_key(&session.id) {
            return Err(StageError::SessionNotFound(session.id));
        }
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    /// Apply a short mutation under the lock
    ///
    /// For cheap, synchronous updates only; anything that awaits must use
    /// the snapshot/save path instead.
    pub fn update<F>(&self, session_id: &str, mutate: F) -> Result<Session, StageError>
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| StageError::SessionNotFound(session_id.to_string()))?;
        mutate(session);
        Ok(session.clone())
    }

    /// Delete a session; unknown ids are a no-op
    pub fn delete(&self, session_id: &str) {
        let mut sessions = self.sessions.lock();
        sessions.remove(session_id);
    }

    /// Snapshot of all sessions
    pub fn list(&self) -> Vec<Session> {
        let sessions = self.sessions.lock();
        sessions.values().cloned().collect()
    }
}
