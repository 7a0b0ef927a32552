// Remote play - events from other players, re-timed locally

pub mod retime;

pub use retime::{OrchestraQueue, RetimePolicy, ORCHESTRA_TAG};

use crate::notes::{Octave, Skill};
use serde::{Deserialize, Serialize};

/// One event from a remote player's session.
///
/// `time` is milliseconds on the sender's clock. Senders' clocks are not
/// synchronized with ours; only differences between a single sender's stamps
/// are meaningful, which is why playback re-times against a local baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEvent {
    pub time: u64,
    pub skill: Skill,
    pub octave: Octave,
    pub skill_down: bool,
}
