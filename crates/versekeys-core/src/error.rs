//! Error types for versekeys-core

use thiserror::Error;

/// Result type alias for versekeys-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in versekeys-core
#[derive(Debug, Error)]
pub enum Error {
    /// MIDI backend error (device enumeration or connection)
    #[error("MIDI error: {0}")]
    Midi(String),

    /// Requested device is not present in the current port list
    #[error("MIDI device not found: {0}")]
    DeviceNotFound(String),
}
