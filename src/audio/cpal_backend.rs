//! Microphone capture backend using cpal.
//!
//! Captures at the device's native configuration for maximum
//! compatibility; rate/channel conversion happens later during clip
//! assembly. The cpal stream is not `Send`, so it lives on a dedicated
//! worker thread that owns the device between start and stop.

use super::backend::{AudioFrame, CaptureBackend, CaptureConfig};
use crate::error::{ChatError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

const FRAME_CHANNEL_CAPACITY: usize = 64;

/// Microphone capture via the host audio layer
pub struct CpalBackend {
    config: CaptureConfig,
    stop_flag: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
    capturing: bool,
}

impl CpalBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            stop_flag: Arc::new(AtomicBool::new(false)),
            worker: None,
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for CpalBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.capturing {
            return Err(ChatError::DeviceAccess(anyhow::anyhow!(
                "capture already active"
            )));
        }

        info!(
            "requesting capture stream (aec={}, ns={}, agc={})",
            self.config.echo_cancellation,
            self.config.noise_suppression,
            self.config.auto_gain
        );

        let (frame_tx, frame_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let (ready_tx, ready_rx) = oneshot::channel();

        self.stop_flag = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&self.stop_flag);
        let device_name = self.config.input_device.clone();

        let worker = thread::spawn(move || {
            capture_worker(device_name, frame_tx, ready_tx, stop_flag);
        });

        // Wait for the worker to open the device (or fail) before
        // reporting success.
        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(msg)) => {
                let _ = worker.join();
                return Err(ChatError::DeviceAccess(anyhow::anyhow!(msg)));
            }
            Err(_) => {
                let _ = worker.join();
                return Err(ChatError::DeviceAccess(anyhow::anyhow!(
                    "capture worker exited before opening the device"
                )));
            }
        }

        self.worker = Some(worker);
        self.capturing = true;
        Ok(frame_rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.stop_flag.store(true, Ordering::SeqCst);

        if let Some(worker) = self.worker.take() {
            // Joining releases the device: the worker drops the stream
            // on its way out.
            let joined = tokio::task::spawn_blocking(move || worker.join()).await;
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(_)) => error!("capture worker panicked"),
                Err(e) => error!("failed to join capture worker: {e}"),
            }
        }

        self.capturing = false;
        info!("capture stream released");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "cpal-microphone"
    }
}

/// Owns the cpal stream for the duration of one capture.
///
/// Reports device-open success or failure through `ready_tx`, then pumps
/// frames until the stop flag is set. Empty callbacks are discarded.
fn capture_worker(
    device_name: Option<String>,
    frame_tx: mpsc::Sender<AudioFrame>,
    ready_tx: oneshot::Sender<std::result::Result<(), String>>,
    stop_flag: Arc<AtomicBool>,
) {
    let host = cpal::default_host();

    let device = match find_input_device(&host, device_name.as_deref()) {
        Ok(d) => d,
        Err(msg) => {
            let _ = ready_tx.send(Err(msg));
            return;
        }
    };

    let default_config = match device.default_input_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = ready_tx.send(Err(format!("no default input config: {e}")));
            return;
        }
    };

    let native_rate = default_config.sample_rate();
    let native_channels = default_config.channels();
    let sample_format = default_config.sample_format();

    let stream_config = StreamConfig {
        channels: native_channels,
        sample_rate: native_rate,
        buffer_size: cpal::BufferSize::Default,
    };

    info!(
        "native input config: {}Hz, {} channels, {:?}",
        native_rate, native_channels, sample_format
    );

    let started = Instant::now();
    let err_fn = |err| error!("audio input stream error: {err}");

    let stream = match sample_format {
        SampleFormat::F32 => {
            let tx = frame_tx.clone();
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                    if data.is_empty() {
                        return;
                    }
                    let samples: Vec<i16> = data.iter().map(|&s| float_to_i16(s)).collect();
                    send_frame(&tx, samples, native_rate, native_channels, started);
                },
                err_fn,
                None,
            )
        }
        SampleFormat::I16 => {
            let tx = frame_tx.clone();
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _info: &cpal::InputCallbackInfo| {
                    if data.is_empty() {
                        return;
                    }
                    send_frame(&tx, data.to_vec(), native_rate, native_channels, started);
                },
                err_fn,
                None,
            )
        }
        other => {
            let _ = ready_tx.send(Err(format!("unsupported sample format: {other:?}")));
            return;
        }
    };

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(format!("failed to build input stream: {e}")));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(format!("failed to start input stream: {e}")));
        return;
    }

    let _ = ready_tx.send(Ok(()));
    info!("audio capture started");

    while !stop_flag.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(25));
    }

    // Dropping the stream closes the device; dropping the sender closes
    // the frame channel so the collector can finish.
    drop(stream);
    info!("audio capture stopped");
}

fn find_input_device(
    host: &cpal::Host,
    name: Option<&str>,
) -> std::result::Result<cpal::Device, String> {
    match name {
        Some(name) => host
            .input_devices()
            .map_err(|e| format!("cannot enumerate devices: {e}"))?
            .find(|d| {
                d.description()
                    .ok()
                    .map(|desc| desc.name() == name)
                    .unwrap_or(false)
            })
            .ok_or_else(|| format!("input device '{name}' not found")),
        None => host
            .default_input_device()
            .ok_or_else(|| "no default input device".to_string()),
    }
}

fn send_frame(
    tx: &mpsc::Sender<AudioFrame>,
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
    started: Instant,
) {
    let frame = AudioFrame {
        samples,
        sample_rate,
        channels,
        timestamp_ms: started.elapsed().as_millis() as u64,
    };
    // try_send so the audio callback never blocks
    if tx.try_send(frame).is_err() {
        debug!("frame channel full, dropping frame");
    }
}

fn float_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_conversion_clamps_out_of_range_samples() {
        assert_eq!(float_to_i16(0.0), 0);
        assert_eq!(float_to_i16(1.0), i16::MAX);
        assert_eq!(float_to_i16(2.0), i16::MAX);
        assert_eq!(float_to_i16(-2.0), -i16::MAX);
    }
}
