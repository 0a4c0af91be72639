use super::backend::AudioFrame;
use crate::error::{ChatError, Result};
use std::io::Cursor;
use tracing::info;

/// A finished recording: all captured fragments assembled into a single
/// WAV object ready for upload.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Encoded WAV bytes (16-bit PCM)
    pub wav_bytes: Vec<u8>,
    /// Sample rate of the encoded audio
    pub sample_rate: u32,
    /// Channel count of the encoded audio
    pub channels: u16,
    /// Total samples written
    pub sample_count: usize,
}

impl AudioClip {
    /// Assemble captured frames into one WAV clip.
    ///
    /// Frames are converted to the target rate/channel layout before
    /// encoding. Zero frames (or frames holding no samples) is an
    /// empty-capture error; no clip is produced.
    pub fn assemble(
        frames: Vec<AudioFrame>,
        target_sample_rate: u32,
        target_channels: u16,
    ) -> Result<Self> {
        if frames.iter().all(|f| f.samples.is_empty()) {
            return Err(ChatError::EmptyCapture);
        }

        let spec = hound::WavSpec {
            channels: target_channels,
            sample_rate: target_sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        let mut sample_count = 0usize;

        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| ChatError::Encode(e.to_string()))?;

            for frame in frames {
                let frame = process_frame(frame, target_sample_rate, target_channels);
                for &sample in &frame.samples {
                    writer
                        .write_sample(sample)
                        .map_err(|e| ChatError::Encode(e.to_string()))?;
                }
                sample_count += frame.samples.len();
            }

            writer
                .finalize()
                .map_err(|e| ChatError::Encode(e.to_string()))?;
        }

        let wav_bytes = cursor.into_inner();
        info!(
            "clip assembled: {} samples, {} bytes ({:.1}s at {}Hz)",
            sample_count,
            wav_bytes.len(),
            sample_count as f64 / (target_sample_rate as f64 * target_channels as f64),
            target_sample_rate
        );

        Ok(Self {
            wav_bytes,
            sample_rate: target_sample_rate,
            channels: target_channels,
            sample_count,
        })
    }

    /// Clip duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.sample_count as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}

/// Convert a frame to the target rate and channel layout
fn process_frame(frame: AudioFrame, target_sample_rate: u32, target_channels: u16) -> AudioFrame {
    let mut processed = frame;

    if processed.channels != target_channels && target_channels == 1 {
        processed = stereo_to_mono(processed);
    }

    if processed.sample_rate != target_sample_rate {
        processed = downsample_frame(processed, target_sample_rate);
    }

    processed
}

/// Downsample audio frame by decimation
fn downsample_frame(frame: AudioFrame, target_rate: u32) -> AudioFrame {
    if frame.sample_rate == target_rate {
        return frame;
    }

    let ratio = frame.sample_rate / target_rate;
    if ratio <= 1 {
        return frame; // Can't upsample
    }

    // Decimate whole sample groups so interleaved channels stay paired
    let channels = frame.channels.max(1) as usize;
    let downsampled: Vec<i16> = frame
        .samples
        .chunks_exact(channels)
        .step_by(ratio as usize)
        .flatten()
        .copied()
        .collect();

    AudioFrame {
        samples: downsampled,
        sample_rate: target_rate,
        channels: frame.channels,
        timestamp_ms: frame.timestamp_ms,
    }
}

/// Convert stereo to mono by summing channels
fn stereo_to_mono(frame: AudioFrame) -> AudioFrame {
    if frame.channels != 2 {
        return frame; // Only support stereo -> mono
    }

    let mut mono_samples = Vec::with_capacity(frame.samples.len() / 2);

    // Sum left and right channels (no division to preserve volume)
    for chunk in frame.samples.chunks_exact(2) {
        let left = chunk[0] as i32;
        let right = chunk[1] as i32;
        let sum = left + right;
        let mono = sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        mono_samples.push(mono);
    }

    AudioFrame {
        samples: mono_samples,
        sample_rate: frame.sample_rate,
        channels: 1,
        timestamp_ms: frame.timestamp_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(samples: Vec<i16>, sample_rate: u32, channels: u16, timestamp_ms: u64) -> AudioFrame {
        AudioFrame {
            samples,
            sample_rate,
            channels,
            timestamp_ms,
        }
    }

    #[test]
    fn assemble_rejects_zero_frames() {
        let err = AudioClip::assemble(Vec::new(), 16000, 1).unwrap_err();
        assert!(matches!(err, ChatError::EmptyCapture));
    }

    #[test]
    fn assemble_rejects_frames_without_samples() {
        let frames = vec![frame(Vec::new(), 16000, 1, 0)];
        let err = AudioClip::assemble(frames, 16000, 1).unwrap_err();
        assert!(matches!(err, ChatError::EmptyCapture));
    }

    #[test]
    fn assemble_produces_readable_wav() {
        let frames = vec![
            frame(vec![100; 1600], 16000, 1, 0),
            frame(vec![-100; 1600], 16000, 1, 100),
        ];

        let clip = AudioClip::assemble(frames, 16000, 1).unwrap();
        assert_eq!(clip.sample_count, 3200);
        assert!((clip.duration_secs() - 0.2).abs() < 1e-9);

        let reader = hound::WavReader::new(Cursor::new(clip.wav_bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.channels, 1);
        assert_eq!(reader.len(), 3200);
    }

    #[test]
    fn stereo_input_is_folded_to_mono() {
        // Interleaved L/R pairs; sums preserve volume
        let frames = vec![frame(vec![10, 20, 30, 40], 16000, 2, 0)];
        let clip = AudioClip::assemble(frames, 16000, 1).unwrap();
        assert_eq!(clip.sample_count, 2);

        let reader = hound::WavReader::new(Cursor::new(clip.wav_bytes)).unwrap();
        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![30, 70]);
    }

    #[test]
    fn high_rate_input_is_decimated() {
        let frames = vec![frame((0..480).map(|i| i as i16).collect(), 48000, 1, 0)];
        let clip = AudioClip::assemble(frames, 16000, 1).unwrap();
        // 48k -> 16k keeps every 3rd sample
        assert_eq!(clip.sample_count, 160);
    }

    #[test]
    fn stereo_decimation_keeps_channels_paired() {
        // 6 interleaved L/R pairs at 48k; 16k keeps pairs 0 and 3 intact
        let frames = vec![frame((0..12).collect(), 48000, 2, 0)];
        let clip = AudioClip::assemble(frames, 16000, 2).unwrap();
        assert_eq!(clip.sample_count, 4);

        let reader = hound::WavReader::new(Cursor::new(clip.wav_bytes)).unwrap();
        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 1, 6, 7]);
    }
}
