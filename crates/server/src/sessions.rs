use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use mymove_core::flows::FlowState;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("wizard session `{0}` was not found")]
    NotFound(String),
    #[error("wizard session limit of {0} reached")]
    LimitReached(usize),
}

#[derive(Debug)]
struct SessionEntry {
    state: FlowState,
    touched_at: Instant,
    /// Held across a whole read-modify-write of `state`.
    gate: Arc<Mutex<()>>,
}

impl SessionEntry {
    fn new(state: FlowState) -> Self {
        Self { state, touched_at: Instant::now(), gate: Arc::new(Mutex::new(())) }
    }

    fn is_idle(&self, idle_timeout: Duration) -> bool {
        self.touched_at.elapsed() >= idle_timeout
    }
}

/// Exclusive hold on one session. Handlers that read a session's state and
/// write it back after an await keep this for the whole exchange.
pub struct SessionLease {
    session_id: String,
    _gate: OwnedMutexGuard<()>,
}

impl SessionLease {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Wizard state per session id. Kept in memory only; a restart starts every
/// service member from an empty state.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), max_sessions, idle_timeout }
    }

    /// Idle sessions are pruned before the limit is checked.
    pub fn create(&self, state: FlowState) -> Result<String, SessionError> {
        let mut sessions = self.write();
        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, entry| !entry.is_idle(idle_timeout));
        if sessions.len() >= self.max_sessions {
            return Err(SessionError::LimitReached(self.max_sessions));
        }
        let session_id = Uuid::new_v4().to_string();
        sessions.insert(session_id.clone(), SessionEntry::new(state));
        Ok(session_id)
    }

    pub fn get(&self, session_id: &str) -> Option<FlowState> {
        let mut sessions = self.write();
        if sessions.get(session_id)?.is_idle(self.idle_timeout) {
            sessions.remove(session_id);
            return None;
        }
        let entry = sessions.get_mut(session_id)?;
        entry.touched_at = Instant::now();
        Some(entry.state.clone())
    }

    /// Waits until no other lease on the session is held. `None` when the
    /// session does not exist.
    pub async fn lease(&self, session_id: &str) -> Option<SessionLease> {
        let gate = {
            let sessions = self.read();
            let entry = sessions.get(session_id)?;
            Arc::clone(&entry.gate)
        };
        let gate = gate.lock_owned().await;
        Some(SessionLease { session_id: session_id.to_string(), _gate: gate })
    }

    pub fn replace(&self, session_id: &str, state: FlowState) -> Result<(), SessionError> {
        match self.write().get_mut(session_id) {
            Some(entry) => {
                entry.state = state;
                entry.touched_at = Instant::now();
                Ok(())
            }
            None => Err(SessionError::NotFound(session_id.to_string())),
        }
    }

    pub fn remove(&self, session_id: &str) -> Result<(), SessionError> {
        match self.write().remove(session_id) {
            Some(_) => Ok(()),
            None => Err(SessionError::NotFound(session_id.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, SessionEntry>> {
        match self.sessions.read() {
            Ok(sessions) => sessions,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, SessionEntry>> {
        match self.sessions.write() {
            Ok(sessions) => sessions,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
