//! Performance session and note dispatch.
//!
//! A [`Session`] owns the word cursor and the speech/presentation
//! collaborators. It is the single integration point: a trigger note flows
//! through cursor advance, pitch computation, a fire-and-forget speech
//! request and finally a display update - in that fixed order. MIDI parsing
//! and tokenization live in their own modules, never here.

use crate::cursor::WordCursor;
use crate::pitch::note_to_pitch;
use crate::text::tokenize;

/// Shown before any note has been played, or right after a text change.
pub const PLACEHOLDER_WORD: &str = "\u{2014}";

/// Speech synthesis collaborator.
///
/// Requests are fire-and-forget: no completion signal, no backpressure.
/// Notes arriving faster than speech completes produce overlapping requests.
pub trait SpeechSink {
    /// Vocalize `word` at `pitch` (within `[0.3, 2.5]`, 1.0 neutral).
    fn speak(&mut self, word: &str, pitch: f32);
}

impl<T: SpeechSink + ?Sized> SpeechSink for Box<T> {
    fn speak(&mut self, word: &str, pitch: f32) {
        (**self).speak(word, pitch)
    }
}

/// Presentation collaborator.
pub trait Presenter {
    /// Render the spoken word with its 0-based index and the word count.
    fn show_word(&mut self, word: &str, index: usize, total: usize);
    /// Render the MIDI connection status.
    fn midi_status(&mut self, connected: bool, device_name: &str);
}

/// User prompt collaborator, used only for multi-device selection.
pub trait DevicePrompt {
    /// Present the enumerated device names and return the chosen 0-based
    /// index, or `None` on cancellation or invalid input.
    fn choose(&mut self, device_names: &[String]) -> Option<usize>;
}

/// A performance session: current text plus the collaborators that render it.
///
/// All mutable state lives here rather than at module level, so independent
/// sessions can coexist and tests need no shared process state.
pub struct Session<S, P> {
    cursor: WordCursor,
    speech: S,
    presenter: P,
}

impl<S: SpeechSink, P: Presenter> Session<S, P> {
    /// Create a session with no text loaded.
    pub fn new(speech: S, presenter: P) -> Self {
        Self {
            cursor: WordCursor::new(),
            speech,
            presenter,
        }
    }

    /// Replace the performance text.
    ///
    /// Re-tokenizes, resets the cursor to the start and refreshes the
    /// display with the placeholder word.
    pub fn set_text(&mut self, text: &str) {
        let words = tokenize(text);
        let total = words.len();
        log::debug!("text loaded: {} words", total);
        self.cursor.reset(words);
        self.presenter.show_word(PLACEHOLDER_WORD, 0, total);
    }

    /// Handle a validated trigger note.
    ///
    /// With no text loaded this is a logged no-op, not an error. Otherwise:
    /// cursor advance, pitch compute, speech request, display update.
    pub fn on_note(&mut self, note: u8) {
        let total = self.cursor.len();
        let Some((word, index)) = self.cursor.next_word() else {
            log::debug!("note {} ignored: no text loaded", note);
            return;
        };

        let pitch = note_to_pitch(note);
        self.speech.speak(word, pitch);
        self.presenter.show_word(word, index, total);
    }

    /// Number of words in the loaded text.
    pub fn word_count(&self) -> usize {
        self.cursor.len()
    }

    /// Access the presenter, e.g. to forward connection status updates.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        spoken: Rc<RefCell<Vec<(String, f32)>>>,
        shown: Rc<RefCell<Vec<(String, usize, usize)>>>,
        status: Rc<RefCell<Vec<(bool, String)>>>,
    }

    struct RecordingSpeech(Rc<RefCell<Vec<(String, f32)>>>);
    impl SpeechSink for RecordingSpeech {
        fn speak(&mut self, word: &str, pitch: f32) {
            self.0.borrow_mut().push((word.to_string(), pitch));
        }
    }

    struct RecordingPresenter {
        shown: Rc<RefCell<Vec<(String, usize, usize)>>>,
        status: Rc<RefCell<Vec<(bool, String)>>>,
    }
    impl Presenter for RecordingPresenter {
        fn show_word(&mut self, word: &str, index: usize, total: usize) {
            self.shown.borrow_mut().push((word.to_string(), index, total));
        }
        fn midi_status(&mut self, connected: bool, device_name: &str) {
            self.status
                .borrow_mut()
                .push((connected, device_name.to_string()));
        }
    }

    fn session_with_recorder() -> (Session<RecordingSpeech, RecordingPresenter>, Recorder) {
        let recorder = Recorder::default();
        let session = Session::new(
            RecordingSpeech(recorder.spoken.clone()),
            RecordingPresenter {
                shown: recorder.shown.clone(),
                status: recorder.status.clone(),
            },
        );
        (session, recorder)
    }

    #[test]
    fn test_note_without_text_is_noop() {
        let (mut session, recorder) = session_with_recorder();
        session.on_note(60);
        assert!(recorder.spoken.borrow().is_empty());
        assert!(recorder.shown.borrow().is_empty());
    }

    #[test]
    fn test_set_text_resets_display_with_placeholder() {
        let (mut session, recorder) = session_with_recorder();
        session.set_text("blue skies smiling at me");
        assert_eq!(session.word_count(), 5);
        assert_eq!(
            recorder.shown.borrow().as_slice(),
            &[(PLACEHOLDER_WORD.to_string(), 0, 5)]
        );
    }

    #[test]
    fn test_rap_scenario() {
        let (mut session, recorder) = session_with_recorder();
        session.set_text("blue skies smiling at me");

        session.on_note(60);
        session.on_note(60);
        session.on_note(60);
        session.on_note(72);

        let spoken = recorder.spoken.borrow();
        assert_eq!(spoken.len(), 4);
        assert_eq!(spoken[0].0, "blue");
        assert_eq!(spoken[1].0, "skies");
        assert_eq!(spoken[2].0, "smiling");
        assert_eq!(spoken[3].0, "at");
        for entry in spoken.iter().take(3) {
            assert!((entry.1 - 1.0).abs() < 1e-6);
        }
        assert!((spoken[3].1 - 2.2).abs() < 1e-6);

        let shown = recorder.shown.borrow();
        // First entry is the placeholder from set_text
        assert_eq!(shown[1], ("blue".to_string(), 0, 5));
        assert_eq!(shown[4], ("at".to_string(), 3, 5));
    }

    #[test]
    fn test_wraps_past_end_of_text() {
        let (mut session, recorder) = session_with_recorder();
        session.set_text("one two");
        session.on_note(60);
        session.on_note(60);
        session.on_note(60);
        assert_eq!(recorder.spoken.borrow()[2].0, "one");
        assert_eq!(recorder.shown.borrow()[3].1, 0);
    }

    #[test]
    fn test_new_text_restarts_mid_performance() {
        let (mut session, recorder) = session_with_recorder();
        session.set_text("a b c");
        session.on_note(60);
        session.on_note(60);

        session.set_text("x y");
        session.on_note(60);
        assert_eq!(recorder.spoken.borrow().last().unwrap().0, "x");
    }

    #[test]
    fn test_punctuation_never_spoken() {
        let (mut session, recorder) = session_with_recorder();
        session.set_text("Hello, world!");
        session.on_note(64);
        session.on_note(64);
        let spoken = recorder.spoken.borrow();
        assert_eq!(spoken[0].0, "Hello");
        assert_eq!(spoken[1].0, "world");
    }
}
