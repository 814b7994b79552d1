//! In-memory session store.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use maitred_chat::Session;

use crate::error::StoreError;
use crate::SessionStore;

/// Process-lifetime session table.
///
/// Sessions persist until the process exits. Handlers get a clone of the
/// stored state and write it back with [`SessionStore::save`].
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently held.
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    fn get_or_create(&self, id: Uuid) -> Result<Session, StoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(sessions.entry(id).or_insert_with(|| Session::new(id)).clone())
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| StoreError::LockPoisoned)?;
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    fn reset(&self, id: Uuid) -> Result<Session, StoreError> {
        let fresh = Session::new(id);
        let mut sessions = self.sessions.lock().map_err(|_| StoreError::LockPoisoned)?;
        sessions.insert(id, fresh.clone());
        Ok(fresh)
    }
}
