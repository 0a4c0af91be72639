use super::{SpeechEngine, Voice};
use crate::config::SpeechConfig;
use crate::error::{ChatError, Result};
use tracing::{debug, warn};

/// Host text-to-speech engine (platform synthesis via the `tts` crate)
pub struct SystemSpeech {
    inner: tts::Tts,
}

impl SystemSpeech {
    /// Open the host engine and apply fixed rate/pitch/volume from
    /// configuration. Parameters the platform does not support are
    /// skipped.
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let mut inner = tts::Tts::default().map_err(|e| ChatError::Speech(e.to_string()))?;

        let features = inner.supported_features();

        if features.rate {
            let rate = (inner.normal_rate() * config.rate)
                .clamp(inner.min_rate(), inner.max_rate());
            inner
                .set_rate(rate)
                .map_err(|e| ChatError::Speech(e.to_string()))?;
        }

        if features.pitch {
            let pitch = (inner.normal_pitch() * config.pitch)
                .clamp(inner.min_pitch(), inner.max_pitch());
            inner
                .set_pitch(pitch)
                .map_err(|e| ChatError::Speech(e.to_string()))?;
        }

        if features.volume {
            let volume = (inner.max_volume() * config.volume)
                .clamp(inner.min_volume(), inner.max_volume());
            inner
                .set_volume(volume)
                .map_err(|e| ChatError::Speech(e.to_string()))?;
        }

        Ok(Self { inner })
    }
}

impl SpeechEngine for SystemSpeech {
    fn voices(&self) -> Vec<Voice> {
        // Voice enumeration can fail or come back empty while the host
        // engine is still warming up; treat both as "no voices yet".
        match self.inner.voices() {
            Ok(voices) => voices
                .into_iter()
                .map(|v| Voice {
                    name: v.name(),
                    language: v.language().to_string(),
                })
                .collect(),
            Err(e) => {
                debug!("voice enumeration unavailable: {e}");
                Vec::new()
            }
        }
    }

    fn speak(&mut self, text: &str, voice: Option<&Voice>) -> Result<()> {
        if let Some(selected) = voice {
            match self.inner.voices() {
                Ok(host_voices) => {
                    if let Some(v) = host_voices.iter().find(|v| v.name() == selected.name) {
                        if let Err(e) = self.inner.set_voice(v) {
                            warn!("failed to select voice '{}': {e}", selected.name);
                        }
                    }
                }
                Err(e) => debug!("voice enumeration unavailable: {e}"),
            }
        }

        // interrupt=true cancels whatever is currently playing
        self.inner
            .speak(text, true)
            .map_err(|e| ChatError::Speech(e.to_string()))?;
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        self.inner
            .stop()
            .map_err(|e| ChatError::Speech(e.to_string()))?;
        Ok(())
    }
}
