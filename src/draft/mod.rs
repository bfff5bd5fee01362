//! Draft persistence
//!
//! Seeds forms from a stored snapshot and keeps that snapshot current with
//! a debounced observer of the form's value stream.

mod persister;
mod snapshot;
mod storage;

pub use persister::{DraftPersister, DraftSubscription, DEFAULT_DEBOUNCE};
pub use snapshot::{load, save, DraftSnapshot, DraftSpec};
pub use storage::{DraftStorage, FileStorage, MemoryStorage};

#[cfg(test)]
pub use storage::MockDraftStorage;
