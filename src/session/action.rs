// Action log data model - timestamped, offset-relative session records

use crate::notes::{Note, Octave, Skill};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One recorded user interaction.
///
/// Internally tagged so an unrecognized `kind` in a stored log decodes to
/// [`Action::Unknown`] instead of failing the whole recording; replay skips
/// it with a warning. The log format must tolerate forward evolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Action {
    /// Opens every recording; carries the ambient octave at the origin so
    /// live replay can restore it.
    StartRecording { octave: Octave },
    /// Closes an explicitly stopped recording and terminates replay.
    StopRecording,
    /// A note was sounded (replayed directly in non-live playback).
    PlayNote { note: Note },
    /// The ambient octave changed to this value (already clamped).
    ChangeOctave { octave: Octave },
    /// A skill transitioned to held (re-drives the state machine in live
    /// playback).
    SkillActivated { skill: Skill, octave: Octave },
    /// A skill was released.
    SkillDeactivated { skill: Skill, octave: Octave },
    /// Catch-all for kinds this build does not know.
    #[serde(other)]
    Unknown,
}

/// One entry of the action log: an action at a non-negative offset from the
/// recording origin, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub offset_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

/// Schema version of the stored recording format.
///
/// The original format carried no version; one is added defensively. A
/// document without the field decodes as 1.0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FormatVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        FormatVersion {
            major,
            minor,
            patch,
        }
    }

    /// The version this build writes.
    pub const fn current() -> Self {
        FormatVersion::new(1, 0, 0)
    }

    /// Version assumed for stored documents that predate the field.
    pub const fn assumed_legacy() -> Self {
        FormatVersion::new(1, 0, 0)
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        FormatVersion::assumed_legacy()
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A frozen, ordered sequence of action records.
///
/// Created by [`crate::session::ActionRecorder::stop`]; immutable once
/// published to a store. Records are ordered by non-decreasing offset
/// because the recorder appends in wall-clock order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub version: FormatVersion,
    /// RFC3339 creation stamp.
    pub created: String,
    pub actions: Vec<ActionRecord>,
}

impl Recording {
    /// Freeze a finished action log under the current format version.
    pub fn from_actions(actions: Vec<ActionRecord>) -> Self {
        Recording {
            version: FormatVersion::current(),
            created: chrono::Utc::now().to_rfc3339(),
            actions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Offset of the last record, i.e. the recording length in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.actions.last().map_or(0, |record| record.offset_ms)
    }
}
