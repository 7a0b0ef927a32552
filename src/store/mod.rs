// Recording persistence boundary
// Stores hold frozen recordings under opaque ids; both save and load can
// fail and the core degrades instead of crashing

pub mod file;
pub mod serialization;

pub use file::FileStore;

use crate::session::action::{FormatVersion, Recording};
use std::collections::HashMap;

/// Opaque identifier a store hands out for a published recording.
pub type RecordingId = uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("recording not found: {0}")]
    NotFound(RecordingId),

    #[error("no recording to save")]
    NothingToSave,

    #[error("unsupported recording format version {0}")]
    UnsupportedVersion(FormatVersion),

    #[error("invalid recording: {0}")]
    Invalid(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Save/load boundary for frozen recordings. A published recording is
/// immutable; stores never update in place.
pub trait RecordingStore {
    fn save(&mut self, recording: &Recording) -> Result<RecordingId, StoreError>;

    fn load(&self, id: RecordingId) -> Result<Recording, StoreError>;
}

/// In-memory store, mainly for tests and headless shells. Keeps the encoded
/// form so load exercises the same decode path as a real store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<RecordingId, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RecordingStore for MemoryStore {
    fn save(&mut self, recording: &Recording) -> Result<RecordingId, StoreError> {
        let encoded = serialization::encode_recording(recording)?;
        let id = RecordingId::new_v4();
        self.entries.insert(id, encoded);
        Ok(id)
    }

    fn load(&self, id: RecordingId) -> Result<Recording, StoreError> {
        let encoded = self.entries.get(&id).ok_or(StoreError::NotFound(id))?;
        serialization::decode_recording(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::Octave;
    use crate::session::action::{Action, ActionRecord};

    fn sample_recording() -> Recording {
        Recording::from_actions(vec![
            ActionRecord {
                offset_ms: 0,
                action: Action::StartRecording {
                    octave: Octave::default(),
                },
            },
            ActionRecord {
                offset_ms: 120,
                action: Action::StopRecording,
            },
        ])
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        let recording = sample_recording();

        let id = store.save(&recording).unwrap();
        let loaded = store.load(id).unwrap();
        assert_eq!(loaded, recording);
    }

    #[test]
    fn test_memory_store_missing_id() {
        let store = MemoryStore::new();
        let err = store.load(RecordingId::new_v4()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_each_save_gets_a_fresh_id() {
        let mut store = MemoryStore::new();
        let recording = sample_recording();

        let first = store.save(&recording).unwrap();
        let second = store.save(&recording).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }
}
