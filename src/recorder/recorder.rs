use crate::audio::{AudioClip, AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig};
use crate::error::{ChatError, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Produces a capture backend for each recording cycle (and for the
/// startup permission probe). Injectable so tests can script the device.
pub type BackendFactory =
    Arc<dyn Fn(&CaptureConfig) -> Result<Box<dyn CaptureBackend>> + Send + Sync>;

/// Outcome of a toggle invocation
#[derive(Debug)]
pub enum Toggle {
    /// Recording started
    Started,
    /// Recording stopped and the captured fragments were assembled
    Finished(AudioClip),
}

/// Recording state machine: at most one active capture at a time.
///
/// `toggle` maps to start or stop based on current state. Stop releases
/// the device unconditionally before clip assembly, so a failed assembly
/// never leaks the microphone.
pub struct Recorder {
    config: CaptureConfig,
    factory: BackendFactory,
    backend: Option<Box<dyn CaptureBackend>>,
    collector: Option<JoinHandle<Vec<AudioFrame>>>,
    started_at: Option<Instant>,
    active: bool,
}

impl Recorder {
    /// Create a recorder using the platform capture backend
    pub fn new(config: CaptureConfig) -> Self {
        Self::with_factory(config, Arc::new(|cfg| CaptureBackendFactory::create(cfg.clone())))
    }

    /// Create a recorder with a custom backend factory
    pub fn with_factory(config: CaptureConfig, factory: BackendFactory) -> Self {
        Self {
            config,
            factory,
            backend: None,
            collector: None,
            started_at: None,
            active: false,
        }
    }

    /// Whether a recording is currently active
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Time since the current recording started
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }

    /// Start or stop based on current state
    pub async fn toggle(&mut self) -> Result<Toggle> {
        if self.active {
            let clip = self.stop().await?;
            Ok(Toggle::Finished(clip))
        } else {
            self.start().await?;
            Ok(Toggle::Started)
        }
    }

    /// Open the capture device once to verify access, releasing it
    /// immediately. Used at startup to drive the microphone indicator.
    pub async fn probe(&self) -> Result<()> {
        let mut backend = (self.factory)(&self.config)?;
        let _frames = backend.start().await?;
        backend.stop().await?;
        info!("microphone probe succeeded");
        Ok(())
    }

    /// Begin a capture cycle
    async fn start(&mut self) -> Result<()> {
        if self.active {
            warn!("recording already active");
            return Ok(());
        }

        let mut backend = (self.factory)(&self.config)?;
        let mut frame_rx = backend.start().await?;

        // Accumulate fragments until the backend closes the channel on
        // stop. Empty fragments are discarded at the source, but guard
        // here as well since assembly treats them as no capture.
        let collector = tokio::spawn(async move {
            let mut frames = Vec::new();
            while let Some(frame) = frame_rx.recv().await {
                if !frame.samples.is_empty() {
                    frames.push(frame);
                }
            }
            frames
        });

        self.backend = Some(backend);
        self.collector = Some(collector);
        self.started_at = Some(Instant::now());
        self.active = true;

        info!("recording started");
        Ok(())
    }

    /// End the capture cycle: release the device, then assemble the clip
    async fn stop(&mut self) -> Result<AudioClip> {
        self.active = false;
        self.started_at = None;

        // Release the device first; the hardware must not stay locked
        // even if collection or assembly fails below.
        if let Some(mut backend) = self.backend.take() {
            if let Err(e) = backend.stop().await {
                error!("failed to stop capture backend: {e}");
            }
        }

        let frames = match self.collector.take() {
            Some(collector) => match collector.await {
                Ok(frames) => frames,
                Err(e) => {
                    error!("frame collector panicked: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        info!("recording stopped: {} fragments captured", frames.len());

        AudioClip::assemble(
            frames,
            self.config.target_sample_rate,
            self.config.target_channels,
        )
    }
}

/// Format an elapsed duration as `MM:SS` for the recording timer
pub fn format_duration(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
