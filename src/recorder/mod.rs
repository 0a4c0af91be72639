//! Recording lifecycle management
//!
//! This module provides the `Recorder` state machine that owns the
//! capture-to-clip round trip:
//! - Device acquisition and release (exclusively held while active)
//! - Fragment accumulation from the capture backend
//! - Clip assembly on stop
//! - Duration reporting for the UI timer

mod recorder;

pub use recorder::{format_duration, BackendFactory, Recorder, Toggle};
