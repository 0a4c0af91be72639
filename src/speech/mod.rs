//! Speech output
//!
//! Assistant replies are spoken through the host synthesis engine. The
//! engine sits behind a trait so the controller can be exercised without
//! real audio, and the voice-preference policy is plain data so it is
//! testable on its own.

mod system;

pub use system::SystemSpeech;

use crate::error::Result;

/// A synthesis voice as reported by the host engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag, e.g. "en-US"
    pub language: String,
}

/// Host speech engine seam
///
/// The voice list is a capability that may populate asynchronously after
/// startup: `voices` is queried at every call site and an empty list is
/// never an error.
pub trait SpeechEngine {
    /// Currently known voices (possibly empty early in the process)
    fn voices(&self) -> Vec<Voice>;

    /// Speak `text` with the given voice (engine default when None)
    fn speak(&mut self, text: &str, voice: Option<&Voice>) -> Result<()>;

    /// Cancel the current utterance, if any. Callers invoke this before
    /// `speak` so at most one utterance is audible at a time.
    fn cancel(&mut self) -> Result<()>;
}

/// Voice preference policy: a voice in the preferred language whose name
/// signals higher quality, else any voice in that language, else the
/// engine default (None).
pub fn select_voice<'a>(voices: &'a [Voice], language: &str) -> Option<&'a Voice> {
    voices
        .iter()
        .find(|v| {
            v.language.starts_with(language)
                && (v.name.contains("Enhanced") || v.name.contains("Premium"))
        })
        .or_else(|| voices.iter().find(|v| v.language.starts_with(language)))
}
