// Note vocabulary - skills, octaves, and playable notes
// Fixed tables, never mutated at runtime

pub mod resolver;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user-triggerable action identifier, one of the ten skill-bar slots.
///
/// Skills `1`..`8` are notes; `9` and `0` are the octave-shift sentinels
/// (their meaning is octave-independent, see [`resolver::resolve`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "0")]
    Zero,
}

impl Skill {
    /// All ten skills in skill-bar order.
    pub const ALL: [Skill; 10] = [
        Skill::One,
        Skill::Two,
        Skill::Three,
        Skill::Four,
        Skill::Five,
        Skill::Six,
        Skill::Seven,
        Skill::Eight,
        Skill::Nine,
        Skill::Zero,
    ];

    /// The skill-bar symbol for this skill.
    pub fn symbol(&self) -> char {
        match self {
            Skill::One => '1',
            Skill::Two => '2',
            Skill::Three => '3',
            Skill::Four => '4',
            Skill::Five => '5',
            Skill::Six => '6',
            Skill::Seven => '7',
            Skill::Eight => '8',
            Skill::Nine => '9',
            Skill::Zero => '0',
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Direction of an octave shift sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OctaveShift {
    Down,
    Up,
}

/// Error for an octave value outside the supported range.
#[derive(Debug, Clone, thiserror::Error)]
#[error("octave {0} out of range ({min}..={max})", min = Octave::MIN, max = Octave::MAX)]
pub struct OctaveRangeError(pub u8);

/// Ambient transposition level, bounded to `0..=2` with `1` the default.
///
/// Shifting saturates at the bounds rather than wrapping: shift-down at
/// octave 0 stays at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Octave(u8);

impl Octave {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 2;

    /// Create an octave, rejecting out-of-range values.
    pub fn new(value: u8) -> Result<Self, OctaveRangeError> {
        if value > Self::MAX {
            Err(OctaveRangeError(value))
        } else {
            Ok(Octave(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Apply a shift, saturating within `MIN..=MAX`.
    pub fn shifted(self, shift: OctaveShift) -> Octave {
        match shift {
            OctaveShift::Down => Octave(self.0.saturating_sub(1)),
            OctaveShift::Up => Octave((self.0 + 1).min(Self::MAX)),
        }
    }
}

impl Default for Octave {
    fn default() -> Self {
        Octave(1)
    }
}

impl TryFrom<u8> for Octave {
    type Error = OctaveRangeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Octave::new(value)
    }
}

impl From<Octave> for u8 {
    fn from(octave: Octave) -> u8 {
        octave.0
    }
}

impl fmt::Display for Octave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pitch class of a playable note (natural scale only - the instrument has
/// no accidentals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl PitchClass {
    pub fn letter(&self) -> char {
        match self {
            PitchClass::C => 'C',
            PitchClass::D => 'D',
            PitchClass::E => 'E',
            PitchClass::F => 'F',
            PitchClass::G => 'G',
            PitchClass::A => 'A',
            PitchClass::B => 'B',
        }
    }
}

/// Error parsing a note name such as `"C4"`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid note name: {0:?}")]
pub struct NoteParseError(pub String);

/// A playable sound identifier in scientific pitch notation.
///
/// Serialized as the compact string form the audio assets are named after
/// (`"C4"`), the same representation the stored logs use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Note {
    pub pitch: PitchClass,
    /// Scientific octave number, 3..=6 for this instrument.
    pub octave: u8,
}

impl Note {
    pub const fn new(pitch: PitchClass, octave: u8) -> Self {
        Note { pitch, octave }
    }

    /// Every note the instrument can produce across its three octaves.
    pub const PLAYABLE: [Note; 22] = [
        Note::new(PitchClass::C, 3),
        Note::new(PitchClass::D, 3),
        Note::new(PitchClass::E, 3),
        Note::new(PitchClass::F, 3),
        Note::new(PitchClass::G, 3),
        Note::new(PitchClass::A, 3),
        Note::new(PitchClass::B, 3),
        Note::new(PitchClass::C, 4),
        Note::new(PitchClass::D, 4),
        Note::new(PitchClass::E, 4),
        Note::new(PitchClass::F, 4),
        Note::new(PitchClass::G, 4),
        Note::new(PitchClass::A, 4),
        Note::new(PitchClass::B, 4),
        Note::new(PitchClass::C, 5),
        Note::new(PitchClass::D, 5),
        Note::new(PitchClass::E, 5),
        Note::new(PitchClass::F, 5),
        Note::new(PitchClass::G, 5),
        Note::new(PitchClass::A, 5),
        Note::new(PitchClass::B, 5),
        Note::new(PitchClass::C, 6),
    ];
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch.letter(), self.octave)
    }
}

impl FromStr for Note {
    type Err = NoteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let pitch = match chars.next() {
            Some('C') => PitchClass::C,
            Some('D') => PitchClass::D,
            Some('E') => PitchClass::E,
            Some('F') => PitchClass::F,
            Some('G') => PitchClass::G,
            Some('A') => PitchClass::A,
            Some('B') => PitchClass::B,
            _ => return Err(NoteParseError(s.to_string())),
        };
        let octave: u8 = chars
            .as_str()
            .parse()
            .map_err(|_| NoteParseError(s.to_string()))?;
        Ok(Note { pitch, octave })
    }
}

impl TryFrom<String> for Note {
    type Error = NoteParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Note> for String {
    fn from(note: Note) -> String {
        note.to_string()
    }
}
