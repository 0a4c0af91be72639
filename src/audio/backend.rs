use crate::error::Result;
use tokio::sync::mpsc;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for a capture backend
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate for assembled clips (resampled if needed)
    pub target_sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo)
    pub target_channels: u16,
    /// Preferred input device name (default device when unset)
    pub input_device: Option<String>,
    /// Request echo cancellation from the host where supported
    pub echo_cancellation: bool,
    /// Request noise suppression from the host where supported
    pub noise_suppression: bool,
    /// Request automatic gain control from the host where supported
    pub auto_gain: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16000, // 16kHz for Whisper
            target_channels: 1,        // Mono
            input_device: None,
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain: true,
        }
    }
}

impl CaptureConfig {
    pub fn from_audio_config(cfg: &crate::config::AudioConfig) -> Self {
        Self {
            target_sample_rate: cfg.sample_rate,
            target_channels: cfg.channels,
            input_device: cfg.input_device.clone(),
            echo_cancellation: cfg.echo_cancellation,
            noise_suppression: cfg.noise_suppression,
            auto_gain: cfg.auto_gain,
        }
    }
}

/// Microphone capture backend trait
///
/// The device is exclusively held between `start` and `stop`; `stop`
/// releases the hardware unconditionally. Implementations must never
/// emit empty frames.
#[async_trait::async_trait]
pub trait CaptureBackend: Send {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames. The
    /// channel closes once the backend stops.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio and release the device
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    /// Create the platform capture backend for the given configuration
    pub fn create(config: CaptureConfig) -> Result<Box<dyn CaptureBackend>> {
        let backend = super::cpal_backend::CpalBackend::new(config);
        Ok(Box::new(backend))
    }
}
