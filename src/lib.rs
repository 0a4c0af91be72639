pub mod api;
pub mod audio;
pub mod config;
pub mod controller;
pub mod error;
pub mod recorder;
pub mod speech;
pub mod tui;
pub mod ui;

pub use api::{ChatApi, ChatReply, HttpApi, Message, Role};
pub use audio::{AudioClip, AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig};
pub use config::Config;
pub use controller::ChatController;
pub use error::ChatError;
pub use recorder::{BackendFactory, Recorder, Toggle};
pub use speech::{select_voice, SpeechEngine, SystemSpeech, Voice};
pub use ui::{ChatApp, Indicator};
