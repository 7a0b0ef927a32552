// File-backed recording store - one JSON document per recording

use crate::session::action::Recording;
use crate::store::{serialization, RecordingId, RecordingStore, StoreError};
use std::fs;
use std::path::{Path, PathBuf};

/// Store writing each recording as `<uuid>.json` under one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    /// Platform data directory for recordings, when one exists.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("bardbox").join("recordings"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: RecordingId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl RecordingStore for FileStore {
    fn save(&mut self, recording: &Recording) -> Result<RecordingId, StoreError> {
        let encoded = serialization::encode_recording(recording)?;
        fs::create_dir_all(&self.dir)?;

        let id = RecordingId::new_v4();
        fs::write(self.path_for(id), encoded)?;
        Ok(id)
    }

    fn load(&self, id: RecordingId) -> Result<Recording, StoreError> {
        let encoded = match fs::read_to_string(self.path_for(id)) {
            Ok(encoded) => encoded,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id));
            }
            Err(err) => return Err(err.into()),
        };
        serialization::decode_recording(&encoded)
    }
}
