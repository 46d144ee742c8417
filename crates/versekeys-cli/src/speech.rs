//! Speech output backends.
//!
//! The session's pitch values live in the fixed range `[0.3, 2.5]` with 1.0
//! neutral; speech engines expose their own min/normal/max pitch, so each
//! request is rescaled onto the engine's range before speaking. Requests are
//! fire-and-forget: failures are logged and the performance continues.

use crate::config::SpeechSettings;
use anyhow::{Context, Result};
use tts::Tts;
use versekeys_core::{SpeechSink, MAX_PITCH, MIN_PITCH};

/// Speech sink backed by the platform's native TTS engine.
pub struct TtsSpeech {
    tts: Tts,
    /// Engine pitch range (min, normal, max); `None` when the engine does
    /// not support pitch control
    pitch_range: Option<(f32, f32, f32)>,
}

impl TtsSpeech {
    /// Initialize the platform TTS engine and apply rate/volume/voice
    /// settings once up front. Pitch is set per request.
    pub fn new(settings: &SpeechSettings) -> Result<Self> {
        let mut tts = Tts::default().context("failed to initialize speech engine")?;
        let features = tts.supported_features();

        if features.rate {
            let rate = rescale_around_normal(
                settings.rate,
                tts.min_rate(),
                tts.normal_rate(),
                tts.max_rate(),
            );
            if let Err(e) = tts.set_rate(rate) {
                log::warn!("failed to set speech rate: {}", e);
            }
        }

        if features.volume {
            let min = tts.min_volume();
            let max = tts.max_volume();
            let volume = min + settings.volume.clamp(0.0, 1.0) * (max - min);
            if let Err(e) = tts.set_volume(volume) {
                log::warn!("failed to set speech volume: {}", e);
            }
        }

        if features.voice {
            if let Some(hint) = &settings.voice {
                apply_voice_hint(&mut tts, hint);
            }
        }

        let pitch_range = if features.pitch {
            Some((tts.min_pitch(), tts.normal_pitch(), tts.max_pitch()))
        } else {
            log::warn!("speech engine does not support pitch control");
            None
        };

        Ok(Self { tts, pitch_range })
    }
}

impl SpeechSink for TtsSpeech {
    fn speak(&mut self, word: &str, pitch: f32) {
        if let Some((min, normal, max)) = self.pitch_range {
            let engine_pitch = map_pitch(pitch, min, normal, max);
            if let Err(e) = self.tts.set_pitch(engine_pitch) {
                log::debug!("failed to set pitch {}: {}", engine_pitch, e);
            }
        }
        // interrupt = false: overlapping requests queue in the engine
        if let Err(e) = self.tts.speak(word, false) {
            log::warn!("speech request failed: {}", e);
        }
    }
}

/// Speech sink that discards every request (--mute, or engine init failure).
pub struct NullSpeech;

impl SpeechSink for NullSpeech {
    fn speak(&mut self, _word: &str, _pitch: f32) {}
}

/// Map a session pitch in `[MIN_PITCH, MAX_PITCH]` (1.0 neutral) onto the
/// engine's `[min, max]` range so that 1.0 lands on the engine's normal.
fn map_pitch(pitch: f32, min: f32, normal: f32, max: f32) -> f32 {
    let pitch = pitch.clamp(MIN_PITCH, MAX_PITCH);
    if pitch >= 1.0 {
        normal + (pitch - 1.0) / (MAX_PITCH - 1.0) * (max - normal)
    } else {
        normal - (1.0 - pitch) / (1.0 - MIN_PITCH) * (normal - min)
    }
}

/// Map a multiplier-style setting (1.0 = normal) onto the engine range.
fn rescale_around_normal(value: f32, min: f32, normal: f32, max: f32) -> f32 {
    if value >= 1.0 {
        // Treat anything up to 10x as the top of the engine range
        (normal + (value - 1.0) / 9.0 * (max - normal)).min(max)
    } else {
        (normal - (1.0 - value) * (normal - min)).max(min)
    }
}

/// Pick the first voice whose name contains the hint (case-insensitive).
fn apply_voice_hint(tts: &mut Tts, hint: &str) {
    let hint_lower = hint.to_lowercase();
    match tts.voices() {
        Ok(voices) => {
            if let Some(voice) = voices
                .iter()
                .find(|v| v.name().to_lowercase().contains(&hint_lower))
            {
                log::info!("using voice: {}", voice.name());
                if let Err(e) = tts.set_voice(voice) {
                    log::warn!("failed to set voice: {}", e);
                }
            } else {
                log::warn!("no voice matching '{}' found", hint);
            }
        }
        Err(e) => log::warn!("failed to enumerate voices: {}", e),
    }
}
