//! Error taxonomy for the voice chat client.
//!
//! Every variant is recovered at the point of occurrence: the controller
//! maps it to a banner and a status indicator and the client stays
//! interactive.

/// Top-level error type for the voice round-trip.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Capture device could not be opened or streamed.
    #[error("Microphone access denied. Please allow microphone access to use voice features.")]
    DeviceAccess(anyhow::Error),

    /// Recording stopped with zero captured fragments. Local validation,
    /// never reaches the network.
    #[error("No audio was captured. Please try again.")]
    EmptyCapture,

    /// Backend rejected the request with a structured `detail` payload.
    #[error("{0}")]
    Backend(String),

    /// Transport-level failure (connect, timeout, malformed body).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Clip assembly failed while encoding WAV.
    #[error("audio encoding failed: {0}")]
    Encode(String),

    /// Host speech engine failure.
    #[error("speech synthesis failed: {0}")]
    Speech(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ChatError>;
