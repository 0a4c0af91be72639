use super::messages::{ChatReply, ErrorBody, Message};
use super::ChatApi;
use crate::audio::AudioClip;
use crate::config::ServerConfig;
use crate::error::{ChatError, Result};
use reqwest::multipart;
use std::time::Duration;
use tracing::{debug, info};

/// Fallback shown when a failure response carries no parseable detail
const GENERIC_UPLOAD_ERROR: &str = "Failed to process voice message";

/// HTTP client for the chat backend
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Build a client with a bounded per-request timeout. A hung backend
    /// fails the request instead of keeping the processing overlay up
    /// forever.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success response to the backend's `detail` message,
    /// falling back to a generic one when the payload is not structured.
    async fn error_detail(response: reqwest::Response) -> ChatError {
        let status = response.status();
        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail,
            Err(_) => GENERIC_UPLOAD_ERROR.to_string(),
        };
        debug!("backend rejected request ({status}): {detail}");
        ChatError::Backend(detail)
    }
}

#[async_trait::async_trait]
impl ChatApi for HttpApi {
    async fn fetch_messages(&self) -> Result<Vec<Message>> {
        let response = self.client.get(self.url("/api/messages")).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_detail(response).await);
        }

        let messages: Vec<Message> = response.json().await?;
        info!("fetched {} stored messages", messages.len());
        Ok(messages)
    }

    async fn send_voice_clip(&self, clip: AudioClip) -> Result<ChatReply> {
        info!(
            "uploading clip: {:.1}s, {} bytes",
            clip.duration_secs(),
            clip.wav_bytes.len()
        );

        let part = multipart::Part::bytes(clip.wav_bytes)
            .file_name("recording.wav")
            .mime_str("audio/wav")?;
        let form = multipart::Form::new().part("audio", part);

        let response = self
            .client
            .post(self.url("/api/voice-message"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_detail(response).await);
        }

        Ok(response.json().await?)
    }

    async fn send_text(&self, content: &str) -> Result<ChatReply> {
        let response = self
            .client
            .post(self.url("/api/text-message"))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_detail(response).await);
        }

        Ok(response.json().await?)
    }

    async fn clear_messages(&self) -> Result<()> {
        let response = self.client.delete(self.url("/api/messages")).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_detail(response).await);
        }

        info!("chat history cleared");
        Ok(())
    }

    async fn health(&self) -> Result<()> {
        let response = self.client.get(self.url("/health")).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_detail(response).await);
        }

        Ok(())
    }
}
