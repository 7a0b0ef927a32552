// Serialization for stored recordings - compact JSON with a defensive
// format version checked before any record can fire

use crate::session::action::{Action, FormatVersion, Recording};
use crate::store::StoreError;

/// Serialize a recording to its compact stored form. Refuses to publish a
/// structurally invalid log.
pub fn encode_recording(recording: &Recording) -> Result<String, StoreError> {
    validate_recording(recording)?;
    Ok(serde_json::to_string(recording)?)
}

/// Deserialize a stored recording, checking version compatibility and
/// structure. Any failure here means playback never starts and no state is
/// mutated.
pub fn decode_recording(encoded: &str) -> Result<Recording, StoreError> {
    let recording: Recording = serde_json::from_str(encoded)?;
    check_compatibility(recording.version)?;
    validate_recording(&recording)?;
    Ok(recording)
}

/// A newer major version cannot be read; a newer minor version is assumed
/// forward-compatible (unknown kinds decode as `Unknown` and are skipped).
pub fn check_compatibility(version: FormatVersion) -> Result<(), StoreError> {
    let current = FormatVersion::current();

    if version.major > current.major {
        return Err(StoreError::UnsupportedVersion(version));
    }
    if version.major == current.major && version.minor > current.minor {
        log::warn!(
            "recording format v{version} is newer than v{current}; unknown actions will be skipped"
        );
    }
    Ok(())
}

/// Structural invariants of the action log: non-empty, opened by a
/// `StartRecording` at offset 0, offsets non-decreasing.
pub fn validate_recording(recording: &Recording) -> Result<(), StoreError> {
    let Some(first) = recording.actions.first() else {
        return Err(StoreError::Invalid("recording is empty".to_string()));
    };

    if !matches!(first.action, Action::StartRecording { .. }) {
        return Err(StoreError::Invalid(
            "recording does not open with StartRecording".to_string(),
        ));
    }
    if first.offset_ms != 0 {
        return Err(StoreError::Invalid(
            "recording origin has a non-zero offset".to_string(),
        ));
    }

    let ordered = recording
        .actions
        .windows(2)
        .all(|pair| pair[0].offset_ms <= pair[1].offset_ms);
    if !ordered {
        return Err(StoreError::Invalid(
            "record offsets are not non-decreasing".to_string(),
        ));
    }

    Ok(())
}
