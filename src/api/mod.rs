//! Chat backend client
//!
//! The backend owns the real intelligence (speech-to-text and response
//! generation); this module is the client side of that contract:
//! - `GET /api/messages` - full history, oldest first
//! - `DELETE /api/messages` - clear history
//! - `POST /api/voice-message` - multipart clip upload, replies with the
//!   transcribed user message and the generated assistant message
//! - `POST /api/text-message` - typed message, same reply shape
//! - `GET /health` - connectivity probe

mod client;
mod messages;

pub use client::HttpApi;
pub use messages::{ChatReply, ErrorBody, Message, Role};

use crate::audio::AudioClip;
use crate::error::Result;

/// Backend operations consumed by the controller. A trait seam so tests
/// can drive the UI without a network.
#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    /// Fetch the full message history, oldest first
    async fn fetch_messages(&self) -> Result<Vec<Message>>;

    /// Upload a finished clip; the reply carries both new messages
    async fn send_voice_clip(&self, clip: AudioClip) -> Result<ChatReply>;

    /// Send a typed message; same reply shape as a voice upload
    async fn send_text(&self, content: &str) -> Result<ChatReply>;

    /// Delete all stored history
    async fn clear_messages(&self) -> Result<()>;

    /// Connectivity probe
    async fn health(&self) -> Result<()>;
}

// Shared clients pass through unchanged
#[async_trait::async_trait]
impl<T: ChatApi + ?Sized> ChatApi for std::sync::Arc<T> {
    async fn fetch_messages(&self) -> Result<Vec<Message>> {
        (**self).fetch_messages().await
    }

    async fn send_voice_clip(&self, clip: AudioClip) -> Result<ChatReply> {
        (**self).send_voice_clip(clip).await
    }

    async fn send_text(&self, content: &str) -> Result<ChatReply> {
        (**self).send_text(content).await
    }

    async fn clear_messages(&self) -> Result<()> {
        (**self).clear_messages().await
    }

    async fn health(&self) -> Result<()> {
        (**self).health().await
    }
}
