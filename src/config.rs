use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub audio: AudioConfig,
    pub speech: SpeechConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the chat backend (no trailing slash)
    pub base_url: String,
    /// Upper bound for any single request, in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Preferred input device name (default device when unset)
    pub input_device: Option<String>,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// Rate multiplier relative to the engine's normal rate
    pub rate: f32,
    /// Pitch multiplier relative to the engine's normal pitch
    pub pitch: f32,
    /// Volume in [0.0, 1.0]
    pub volume: f32,
    /// Preferred voice language prefix, e.g. "en"
    pub language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// UI tick interval in milliseconds (drives the duration timer)
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log file path; stderr would corrupt the raw-mode terminal
    pub file: String,
    /// Default tracing filter, overridable via RUST_LOG
    pub filter: String,
}

impl Config {
    /// Load configuration from an optional file, falling back to defaults
    /// for anything the file does not set.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("server.base_url", "http://localhost:8001")?
            .set_default("server.request_timeout_secs", 60i64)?
            .set_default("audio.sample_rate", 16000i64)?
            .set_default("audio.channels", 1i64)?
            .set_default("audio.echo_cancellation", true)?
            .set_default("audio.noise_suppression", true)?
            .set_default("audio.auto_gain", true)?
            .set_default("speech.rate", 0.9f64)?
            .set_default("speech.pitch", 1.0f64)?
            .set_default("speech.volume", 1.0f64)?
            .set_default("speech.language", "en")?
            .set_default("ui.tick_ms", 250i64)?
            .set_default("log.file", "voicechat.log")?
            .set_default("log.filter", "info")?
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_file_is_absent() {
        let cfg = Config::load("config/does-not-exist").unwrap();
        assert_eq!(cfg.server.base_url, "http://localhost:8001");
        assert_eq!(cfg.audio.sample_rate, 16000);
        assert_eq!(cfg.audio.channels, 1);
        assert!(cfg.audio.echo_cancellation);
        assert_eq!(cfg.speech.language, "en");
    }

    #[test]
    fn file_overrides_defaults() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voicechat.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[server]\nbase_url = \"http://127.0.0.1:9000\"\n\n[audio]\nsample_rate = 48000"
        )
        .unwrap();

        let cfg = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.base_url, "http://127.0.0.1:9000");
        assert_eq!(cfg.audio.sample_rate, 48000);
        // untouched sections keep defaults
        assert_eq!(cfg.speech.volume, 1.0);
    }
}
