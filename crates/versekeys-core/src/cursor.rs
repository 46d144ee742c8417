//! Sequential word cursor.
//!
//! Tracks the current position in the loaded word sequence and advances one
//! word per triggered note, wrapping back to the start after the last word
//! so a performance can run longer than the text.

/// Stateful iterator over the current word sequence.
///
/// The sequence is replaced wholesale via [`WordCursor::reset`]; the index
/// is always valid for the current sequence because every replacement
/// resets it to zero.
#[derive(Debug, Clone, Default)]
pub struct WordCursor {
    words: Vec<String>,
    index: usize,
}

impl WordCursor {
    /// Create an empty cursor with no words loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the word sequence and restart from the beginning.
    ///
    /// Any prior position is discarded, even mid-performance.
    pub fn reset(&mut self, words: Vec<String>) {
        self.words = words;
        self.index = 0;
    }

    /// Yield the current word together with its index, then advance.
    ///
    /// Wraps to the start after the last word. Returns `None` when no words
    /// are loaded so the caller can skip speech synthesis; never panics.
    pub fn next_word(&mut self) -> Option<(&str, usize)> {
        if self.words.is_empty() {
            return None;
        }
        let index = self.index;
        self.index = (self.index + 1) % self.words.len();
        Some((self.words[index].as_str(), index))
    }

    /// Number of words in the current sequence.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when no words are loaded.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Index of the word the next trigger will speak.
    pub fn position(&self) -> usize {
        self.index
    }
}
