//! File-backed session store, one JSON record per session identifier.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use maitred_chat::Session;

use crate::error::StoreError;
use crate::SessionStore;

/// One `<session-id>.json` file per session under a sessions directory.
///
/// Records survive process restarts and are never evicted. A record that
/// fails to parse is replaced with a fresh session rather than surfaced as
/// an error; a lost conversation beats a broken endpoint.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the sessions directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn write(&self, session: &Session) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        std::fs::write(self.path(session.id), json)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get_or_create(&self, id: Uuid) -> Result<Session, StoreError> {
        let path = self.path(id);
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<Session>(&content) {
                Ok(session) => return Ok(session),
                Err(e) => {
                    tracing::warn!(
                        session_id = %id,
                        error = %e,
                        "Corrupt session record, starting fresh"
                    );
                }
            }
        }
        let session = Session::new(id);
        self.write(&session)?;
        Ok(session)
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.write(session)
    }

    fn reset(&self, id: Uuid) -> Result<Session, StoreError> {
        let fresh = Session::new(id);
        self.write(&fresh)?;
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maitred_chat::BookingStep;
    use maitred_core::types::ChatMessage;

    #[test]
    fn test_creates_sessions_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("sessions");
        FileStore::new(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_session_survives_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();

        {
            let store = FileStore::new(dir.path()).unwrap();
            let mut session = store.get_or_create(id).unwrap();
            session.step = BookingStep::AwaitingEmail;
            session.history.push(ChatMessage::user("pizza please"));
            store.save(&session).unwrap();
        }

        let store = FileStore::new(dir.path()).unwrap();
        let loaded = store.get_or_create(id).unwrap();
        assert_eq!(loaded.step, BookingStep::AwaitingEmail);
        assert_eq!(loaded.history.last().unwrap().text, "pizza please");
    }

    #[test]
    fn test_one_file_per_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.get_or_create(a).unwrap();
        store.get_or_create(b).unwrap();

        assert!(dir.path().join(format!("{a}.json")).is_file());
        assert!(dir.path().join(format!("{b}.json")).is_file());
    }

    #[test]
    fn test_corrupt_record_replaced_with_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let id = Uuid::new_v4();
        std::fs::write(dir.path().join(format!("{id}.json")), "{ not json").unwrap();

        let session = store.get_or_create(id).unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.step, BookingStep::Greeting);
    }

    #[test]
    fn test_history_persisted_as_sender_text_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let id = Uuid::new_v4();

        let mut session = store.get_or_create(id).unwrap();
        session.history.push(ChatMessage::user("hello"));
        store.save(&session).unwrap();

        let raw = std::fs::read_to_string(dir.path().join(format!("{id}.json"))).unwrap();
        assert!(raw.contains("\"sender\": \"user\""));
        assert!(raw.contains("\"text\": \"hello\""));
    }
}
