pub mod backend;
pub mod clip;
pub mod cpal_backend;

pub use backend::{AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig};
pub use clip::AudioClip;
pub use cpal_backend::CpalBackend;
