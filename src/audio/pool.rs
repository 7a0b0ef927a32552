// Clip pool - pre-instantiated playable handles per note
// Pool grows under overlapping triggers and never shrinks

use crate::audio::AudioSink;
use crate::notes::Note;
use std::collections::HashMap;

/// Handles kept warm per note at preload time, the original's queue length.
pub const DEFAULT_PRELOAD_DEPTH: usize = 5;

/// One playable handle for a loaded clip.
pub trait Clip: Send {
    /// Whether the handle is currently playing (or paused mid-clip) and so
    /// unavailable for reuse.
    fn is_busy(&self) -> bool;

    /// Start playback from the beginning at the given volume.
    fn start(&mut self, volume: f32);
}

/// Loads playable handles for notes. The expensive cold-load lives here;
/// the pool decides when it is unavoidable.
pub trait ClipSource: Send {
    type Clip: Clip;

    fn load(&mut self, note: Note) -> Self::Clip;
}

/// Pool of pre-instantiated clips, one bucket per note.
///
/// `play` picks the first idle handle in the bucket; when every handle is
/// busy it cold-loads one more, plays it, and keeps it permanently. Growth
/// is unbounded under sustained overlapping triggers - accepted in exchange
/// for never paying start-up latency on a trigger.
pub struct ClipPool<S: ClipSource> {
    source: S,
    clips: HashMap<Note, Vec<S::Clip>>,
}

impl<S: ClipSource> ClipPool<S> {
    pub fn new(source: S) -> Self {
        ClipPool {
            source,
            clips: HashMap::new(),
        }
    }

    /// Warm the pool with `depth` handles for each given note.
    pub fn preload(&mut self, notes: &[Note], depth: usize) {
        for &note in notes {
            let bucket = self.clips.entry(note).or_default();
            while bucket.len() < depth {
                bucket.push(self.source.load(note));
            }
        }
    }

    /// Number of handles currently held for a note.
    pub fn depth(&self, note: Note) -> usize {
        self.clips.get(&note).map_or(0, Vec::len)
    }
}

impl<S: ClipSource> AudioSink for ClipPool<S> {
    fn play(&mut self, note: Note, volume: f32) {
        let bucket = self.clips.entry(note).or_default();

        if let Some(clip) = bucket.iter_mut().find(|clip| !clip.is_busy()) {
            clip.start(volume);
            return;
        }

        // Every handle busy: grow the pool by one and keep the new handle.
        let mut clip = self.source.load(note);
        clip.start(volume);
        bucket.push(clip);
    }
}
