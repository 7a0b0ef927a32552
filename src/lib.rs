// Bardbox - Library exports for tests and embedding shells

pub mod audio;
pub mod input;
pub mod messaging;
pub mod notes;
pub mod remote;
pub mod sched;
pub mod session;
pub mod store;

// Re-export commonly used types for convenience
pub use audio::pool::{ClipPool, ClipSource};
pub use audio::{AudioSink, NullSink};
pub use input::bindings::KeyBindings;
pub use input::InputEvent;
pub use messaging::channels::{create_command_channel, create_remote_channel};
pub use messaging::{Command, Notification};
pub use notes::{Note, Octave, OctaveShift, PitchClass, Skill};
pub use remote::{OrchestraQueue, RemoteEvent, RetimePolicy};
pub use sched::{Clock, ManualScheduler, Scheduler, ThreadScheduler, TimerId, TimerTag};
pub use session::{
    Action, ActionRecord, ActionRecorder, FormatVersion, InstrumentSession, NullUi, Recording,
    ReplayError, ReplayMode, ReplayPlayer, UiNotifier,
};
pub use store::{FileStore, MemoryStore, RecordingId, RecordingStore, StoreError};
