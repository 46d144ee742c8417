//! versekeys-core - State machine for MIDI-driven spoken-word performance.
//!
//! versekeys turns a MIDI keyboard into a talking instrument: every note-on
//! speaks the next word of a loaded text at a pitch derived from the note
//! number. This crate provides the fundamental building blocks:
//!
//! - **Text** - Tokenization of raw poem text into speakable words
//! - **Pitch** - Deterministic MIDI-note-to-speech-pitch mapping
//! - **Cursor** - Cyclic sequential iteration over the word sequence
//! - **MIDI** - Message filtering plus the device lifecycle state machine
//!   (discovery, selection, hot-plug) and its midir-backed manager
//! - **Session** - The dispatcher tying a trigger note to cursor advance,
//!   pitch computation, speech request and display update
//! - **Melody** - Reference note tables for playing along
//!
//! Speech synthesis and presentation are external collaborators behind the
//! [`SpeechSink`] and [`Presenter`] traits; the core decides *what* word and
//! pitch to request, never how audio is rendered.
//!
//! # Feature Flags
//!
//! - `native` (default) - Hardware MIDI input via midir. Without it the
//!   crate still provides the full pure core (tokenizer, pitch mapper,
//!   cursor, state machine, session).

pub mod cursor;
pub mod error;
pub mod melody;
pub mod midi;
pub mod pitch;
pub mod session;
pub mod text;

// Re-export main types for convenience
pub use cursor::WordCursor;
pub use error::{Error, Result};
pub use melody::{Melody, MELODIES};
pub use midi::{
    diff_ports, trigger_note, Effect, HotPlugEvent, MidiDeviceInfo, MidiMessage, Notice,
    SessionState,
};
pub use pitch::{note_name, note_to_frequency, note_to_pitch, MAX_PITCH, MIN_PITCH, NEUTRAL_NOTE};
pub use session::{DevicePrompt, Presenter, Session, SpeechSink, PLACEHOLDER_WORD};
pub use text::tokenize;

#[cfg(feature = "native")]
pub use midi::MidiSessionManager;
