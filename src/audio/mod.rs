// Audio boundary - fire-and-forget playback requests
// Device failures are swallowed by the collaborator, never surfaced here

pub mod pool;

pub use pool::{Clip, ClipPool, ClipSource};

use crate::notes::Note;

/// Playback target for resolved notes.
///
/// `volume` is in `[0.0, 1.0]`. Implementations must not block and must not
/// report failures back; an unplayable note simply makes no sound.
pub trait AudioSink: Send {
    fn play(&mut self, note: Note, volume: f32);
}

/// Sink that discards every request. Useful for shells that run the logic
/// without an audio device.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _note: Note, _volume: f32) {}
}
