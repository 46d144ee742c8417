//! MIDI note to speech pitch mapping.
//!
//! Speech engines expose a normalized pitch parameter with limited
//! resolution, so the mapping is deliberately exaggerated: each semitone
//! moves the pitch by a fixed 0.1 step around the neutral value at note 60.
//! The result is clamped to the range the engine can render meaningfully.

/// MIDI note that maps to the neutral speech pitch of 1.0
pub const NEUTRAL_NOTE: u8 = 60;

/// Pitch change per semitone away from [`NEUTRAL_NOTE`]
pub const PITCH_STEP: f32 = 0.1;

/// Lowest pitch value requested from the speech engine
pub const MIN_PITCH: f32 = 0.3;

/// Highest pitch value requested from the speech engine
pub const MAX_PITCH: f32 = 2.5;

/// Map a MIDI note number to a speech pitch value.
///
/// Pure and deterministic: note 60 yields 1.0, each semitone shifts by
/// [`PITCH_STEP`], and the result is clamped to `[MIN_PITCH, MAX_PITCH]`.
/// Monotonic non-decreasing over the whole input range; out-of-range notes
/// clamp rather than error.
pub fn note_to_pitch(note: u8) -> f32 {
    let semitones = note as f32 - NEUTRAL_NOTE as f32;
    (1.0 + semitones * PITCH_STEP).clamp(MIN_PITCH, MAX_PITCH)
}

/// Convert a MIDI note number to its equal-temperament frequency in Hz
/// (A4 = note 69 = 440 Hz). Used for display only, never for speech.
pub fn note_to_frequency(note: u8) -> f32 {
    440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
}

/// Note names within an octave
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Human-readable note name, e.g. 60 -> "C4"
pub fn note_name(note: u8) -> String {
    let octave = (note / 12) as i8 - 1;
    format!("{}{}", NOTE_NAMES[(note % 12) as usize], octave)
}
