//! Session persistence for maitred.
//!
//! A small store abstraction over per-conversation state, injected into
//! the HTTP handlers so the backing implementation (in-memory table vs.
//! one file per session) is swappable and testable independently of the
//! HTTP plumbing.
//!
//! There is deliberately no eviction and no cross-request concurrency
//! guard: two near-simultaneous requests for the same session race on
//! read-modify-write and the last write wins. That matches the
//! single-user deployment this serves.

pub mod error;
pub mod file;
pub mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

use uuid::Uuid;

use maitred_chat::Session;

/// Keyed access to per-conversation session state.
pub trait SessionStore: Send + Sync {
    /// Fetch the session for `id`, creating a fresh one at the greeting
    /// step if none exists yet.
    fn get_or_create(&self, id: Uuid) -> Result<Session, StoreError>;

    /// Persist the session under its identifier, replacing any previous
    /// state.
    fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Reinitialize the session to the greeting step, discarding booking
    /// fields and history but keeping the identifier. Returns the fresh
    /// session.
    fn reset(&self, id: Uuid) -> Result<Session, StoreError>;
}
