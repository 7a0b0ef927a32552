// Note resolver - pure (skill, octave) -> note-or-shift mapping

use super::{Note, Octave, OctaveShift, PitchClass, Skill};

/// Result of resolving a skill at a given octave: a playable note or one of
/// the two octave-shift sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Note(Note),
    Shift(OctaveShift),
}

/// Resolve a skill at an octave.
///
/// Skills `1`..`7` follow the natural scale from C; skill `8` is the octave
/// above skill `1`. Skills `9` and `0` resolve to the shift sentinels in
/// every octave. Returns `None` when no mapping exists for the pair; callers
/// treat that as a silent no-op.
pub fn resolve(skill: Skill, octave: Octave) -> Option<Resolved> {
    // Octave 1 centers the instrument on C4..C5.
    let base = 3 + octave.value();

    let resolved = match skill {
        Skill::One => Resolved::Note(Note::new(PitchClass::C, base)),
        Skill::Two => Resolved::Note(Note::new(PitchClass::D, base)),
        Skill::Three => Resolved::Note(Note::new(PitchClass::E, base)),
        Skill::Four => Resolved::Note(Note::new(PitchClass::F, base)),
        Skill::Five => Resolved::Note(Note::new(PitchClass::G, base)),
        Skill::Six => Resolved::Note(Note::new(PitchClass::A, base)),
        Skill::Seven => Resolved::Note(Note::new(PitchClass::B, base)),
        Skill::Eight => Resolved::Note(Note::new(PitchClass::C, base + 1)),
        Skill::Nine => Resolved::Shift(OctaveShift::Down),
        Skill::Zero => Resolved::Shift(OctaveShift::Up),
    };

    Some(resolved)
}
