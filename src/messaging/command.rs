// Command types - communication shell -> session

use crate::input::InputEvent;

#[derive(Debug, Clone, Copy)]
pub enum Command {
    /// A decoded skill press/release from the input collaborator.
    Input(InputEvent),
    /// Set the effective playback volume, clamped to [0.0, 1.0].
    SetVolume(f32),
    /// Start recording, or stop and freeze the current take.
    ToggleRecording,
}
