//! Top-level controller
//!
//! Owns the widget state and the injected collaborators (backend client,
//! speech engine, recorder) and maps UI events onto the voice round-trip:
//! toggle -> clip -> upload -> two messages appended -> reply spoken.
//!
//! Upload cycles are serialized: while one is in flight the record toggle
//! is ignored, so a second clip can never overtake a pending reply.

use crate::api::ChatApi;
use crate::audio::AudioClip;
use crate::error::ChatError;
use crate::recorder::{format_duration, Recorder, Toggle};
use crate::speech::{select_voice, SpeechEngine};
use crate::ui::{ChatApp, Indicator};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use std::time::Instant;
use tracing::{error, info, warn};

/// Work queued by a key event, performed under the processing overlay
enum PendingSend {
    Clip(AudioClip),
    Text(String),
}

pub struct ChatController<A: ChatApi, S: SpeechEngine> {
    pub app: ChatApp,
    api: A,
    speech: S,
    recorder: Recorder,
    /// Preferred voice language prefix for replies
    language: String,
    pending: Option<PendingSend>,
}

impl<A: ChatApi, S: SpeechEngine> ChatController<A, S> {
    pub fn new(api: A, speech: S, recorder: Recorder, language: String) -> Self {
        Self {
            app: ChatApp::new(),
            api,
            speech,
            recorder,
            language,
            pending: None,
        }
    }

    /// Startup sequence: probe the microphone once (released
    /// immediately), check backend health, then load stored history. A
    /// failed history fetch degrades silently to an empty thread.
    pub async fn startup(&mut self) {
        match self.recorder.probe().await {
            Ok(()) => self.app.mic_status = Indicator::Ready,
            Err(e) => {
                warn!("microphone probe failed: {e}");
                self.app.mic_status = Indicator::Error;
            }
        }

        match self.api.health().await {
            Ok(()) => self.app.api_status = Indicator::Ready,
            Err(e) => {
                warn!("backend health check failed: {e}");
                self.app.api_status = Indicator::Error;
            }
        }

        match self.api.fetch_messages().await {
            Ok(messages) => {
                info!("loaded {} stored messages", messages.len());
                self.app.set_messages(messages);
            }
            Err(e) => error!("failed to load messages: {e}"),
        }
    }

    /// Whether a queued send is waiting for `process_pending`
    pub fn has_pending_send(&self) -> bool {
        self.pending.is_some()
    }

    /// Refresh the `MM:SS` recording timer from the recorder clock
    pub fn update_timer(&mut self) {
        self.app.recording_duration = match self.recorder.elapsed() {
            Some(elapsed) => format_duration(elapsed),
            None => "00:00".to_string(),
        };
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Text-entry mode consumes every key until submit or cancel
        if self.app.input.is_some() {
            match key.code {
                KeyCode::Char(c) => {
                    if let Some(buffer) = self.app.input.as_mut() {
                        buffer.push(c);
                    }
                }
                KeyCode::Backspace => {
                    if let Some(buffer) = self.app.input.as_mut() {
                        buffer.pop();
                    }
                }
                KeyCode::Enter => {
                    let content = self.app.input.take().unwrap_or_default();
                    let content = content.trim().to_string();
                    if !content.is_empty() {
                        self.pending = Some(PendingSend::Text(content));
                        self.app.processing = true;
                    }
                }
                KeyCode::Esc => {
                    self.app.input = None;
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('r') => self.toggle_recording().await,
            KeyCode::Char('c') => self.clear_chat().await,
            KeyCode::Char('p') => self.replay_last(),
            KeyCode::Char('i') => self.app.input = Some(String::new()),
            KeyCode::Char('h') => self.app.show_help = !self.app.show_help,
            KeyCode::Char('q') => self.app.should_quit = true,
            // Esc dismisses a visible error banner before it quits
            KeyCode::Esc => {
                if self.app.banner_text().is_some() {
                    self.app.dismiss_banner();
                } else {
                    self.app.should_quit = true;
                }
            }
            _ => {}
        }
    }

    /// Start or stop recording. Ignored while an upload is in flight.
    pub async fn toggle_recording(&mut self) {
        if self.app.processing || self.pending.is_some() {
            warn!("record toggle ignored: upload in flight");
            return;
        }

        match self.recorder.toggle().await {
            Ok(Toggle::Started) => {
                self.app.recording = true;
                self.app.mic_status = Indicator::Ready;
            }
            Ok(Toggle::Finished(clip)) => {
                self.app.recording = false;
                self.app.recording_duration = "00:00".to_string();
                self.pending = Some(PendingSend::Clip(clip));
                self.app.processing = true;
            }
            Err(ChatError::EmptyCapture) => {
                // local validation: no network call is made
                self.app.recording = false;
                self.app.recording_duration = "00:00".to_string();
                self.app
                    .show_error(ChatError::EmptyCapture.to_string(), Instant::now());
            }
            Err(e @ ChatError::DeviceAccess(_)) => {
                self.app.mic_status = Indicator::Error;
                self.app.show_error(e.to_string(), Instant::now());
            }
            Err(e) => {
                self.app.recording = false;
                self.app.show_error(e.to_string(), Instant::now());
            }
        }
    }

    /// Perform the queued send under the processing overlay. The overlay
    /// is cleared on every path out of this function.
    pub async fn process_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            self.app.processing = false;
            return;
        };

        let result = match pending {
            PendingSend::Clip(clip) => self.api.send_voice_clip(clip).await,
            PendingSend::Text(content) => self.api.send_text(&content).await,
        };

        match result {
            Ok(reply) => {
                self.app.append_message(reply.user_message);
                self.app.append_message(reply.assistant_message.clone());
                self.app.api_status = Indicator::Ready;
                self.speak(&reply.assistant_message.content);
            }
            Err(e) => {
                let detail = match &e {
                    ChatError::Backend(detail) => detail.clone(),
                    other => other.to_string(),
                };
                self.app.show_error(
                    format!("Failed to process voice message: {detail}"),
                    Instant::now(),
                );
                self.app.api_status = Indicator::Error;
            }
        }

        self.app.processing = false;
    }

    /// Request deletion of all stored history
    pub async fn clear_chat(&mut self) {
        match self.api.clear_messages().await {
            Ok(()) => {
                self.app.clear_thread();
                self.app.api_status = Indicator::Ready;
                self.app.show_success("Chat history cleared", Instant::now());
            }
            Err(e) => {
                warn!("failed to clear chat: {e}");
                self.app.api_status = Indicator::Error;
                self.app
                    .show_error("Failed to clear chat history", Instant::now());
            }
        }
    }

    /// Speak the newest assistant message again
    pub fn replay_last(&mut self) {
        if let Some(content) = self.app.last_assistant_content().map(str::to_string) {
            self.speak(&content);
        }
    }

    /// Route text to the speech engine with the preferred voice. Any
    /// utterance already playing is cancelled first, so at most one is
    /// audible at a time. The voice list is re-queried on every call
    /// since it may populate after startup; speech failures are logged,
    /// never fatal.
    fn speak(&mut self, text: &str) {
        if let Err(e) = self.speech.cancel() {
            warn!("failed to cancel current utterance: {e}");
        }
        let voices = self.speech.voices();
        let voice = select_voice(&voices, &self.language);
        if let Err(e) = self.speech.speak(text, voice) {
            warn!("speech output failed: {e}");
        }
    }
}
