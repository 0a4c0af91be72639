use crate::api::Message;
use std::time::{Duration, Instant};

/// Error banners auto-hide after this long
const BANNER_TTL: Duration = Duration::from_secs(5);
/// Success toasts auto-remove after this long
const TOAST_TTL: Duration = Duration::from_secs(3);

/// Tri-state health indicator driven by the most recent relevant
/// operation only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Unknown,
    Ready,
    Error,
}

/// A transient notification with an expiry deadline
#[derive(Debug, Clone)]
struct Notice {
    text: String,
    expires_at: Instant,
}

/// Widget state for the chat client.
///
/// Owned by the controller; never a global. Messages are immutable once
/// appended and ordered by arrival.
pub struct ChatApp {
    messages: Vec<Message>,
    pub mic_status: Indicator,
    pub api_status: Indicator,
    banner: Option<Notice>,
    toast: Option<Notice>,
    pub processing: bool,
    pub recording: bool,
    pub recording_duration: String,
    pub show_help: bool,
    /// Text-entry buffer; Some(_) while the user is typing a message
    pub input: Option<String>,
    pub should_quit: bool,
}

impl ChatApp {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            mic_status: Indicator::Unknown,
            api_status: Indicator::Unknown,
            banner: None,
            toast: None,
            processing: false,
            recording: false,
            recording_duration: "00:00".to_string(),
            show_help: false,
            input: None,
            should_quit: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The welcome placeholder shows only while the thread is empty
    pub fn welcome_visible(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replace the thread with fetched history (oldest first)
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Append one message to the end of the thread
    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Empty the thread and restore the welcome placeholder
    pub fn clear_thread(&mut self) {
        self.messages.clear();
    }

    /// Content of the newest assistant message, for replay
    pub fn last_assistant_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::api::Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// Show a dismissible error banner (auto-hidden after 5 seconds)
    pub fn show_error(&mut self, text: impl Into<String>, now: Instant) {
        self.banner = Some(Notice {
            text: text.into(),
            expires_at: now + BANNER_TTL,
        });
    }

    /// Show a transient success toast (auto-removed after 3 seconds)
    pub fn show_success(&mut self, text: impl Into<String>, now: Instant) {
        self.toast = Some(Notice {
            text: text.into(),
            expires_at: now + TOAST_TTL,
        });
    }

    /// Dismiss the error banner ahead of its deadline
    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn banner_text(&self) -> Option<&str> {
        self.banner.as_ref().map(|n| n.text.as_str())
    }

    pub fn toast_text(&self) -> Option<&str> {
        self.toast.as_ref().map(|n| n.text.as_str())
    }

    /// Expire notifications whose deadline has passed
    pub fn tick(&mut self, now: Instant) {
        if self.banner.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.banner = None;
        }
        if self.toast.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.toast = None;
        }
    }

    /// Footer status line
    pub fn status_text(&self) -> &'static str {
        if self.processing {
            "Processing..."
        } else if self.recording {
            "Recording..."
        } else {
            "Ready to chat"
        }
    }
}

impl Default for ChatApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Role;
    use chrono::Utc;

    fn message(role: Role, content: &str) -> Message {
        Message {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn welcome_hides_once_a_message_arrives() {
        let mut app = ChatApp::new();
        assert!(app.welcome_visible());

        app.append_message(message(Role::User, "hi"));
        assert!(!app.welcome_visible());

        app.clear_thread();
        assert!(app.welcome_visible());
    }

    #[test]
    fn loading_history_keeps_arrival_order() {
        let mut app = ChatApp::new();
        app.set_messages(vec![
            message(Role::User, "one"),
            message(Role::Assistant, "two"),
            message(Role::User, "three"),
        ]);

        assert!(!app.welcome_visible());
        let contents: Vec<&str> = app.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[test]
    fn banner_expires_after_five_seconds() {
        let mut app = ChatApp::new();
        let now = Instant::now();

        app.show_error("something broke", now);
        assert_eq!(app.banner_text(), Some("something broke"));

        app.tick(now + Duration::from_secs(4));
        assert!(app.banner_text().is_some());

        app.tick(now + Duration::from_secs(5));
        assert!(app.banner_text().is_none());
    }

    #[test]
    fn banner_can_be_dismissed_before_expiry() {
        let mut app = ChatApp::new();
        let now = Instant::now();

        app.show_error("something broke", now);
        app.dismiss_banner();
        assert!(app.banner_text().is_none());
    }

    #[test]
    fn toast_expires_after_three_seconds() {
        let mut app = ChatApp::new();
        let now = Instant::now();

        app.show_success("Chat history cleared", now);
        app.tick(now + Duration::from_secs(2));
        assert!(app.toast_text().is_some());

        app.tick(now + Duration::from_secs(3));
        assert!(app.toast_text().is_none());
    }

    #[test]
    fn replay_targets_the_newest_assistant_message() {
        let mut app = ChatApp::new();
        assert!(app.last_assistant_content().is_none());

        app.append_message(message(Role::User, "question"));
        app.append_message(message(Role::Assistant, "first answer"));
        app.append_message(message(Role::User, "another question"));
        app.append_message(message(Role::Assistant, "second answer"));

        assert_eq!(app.last_assistant_content(), Some("second answer"));
    }

    #[test]
    fn status_text_reflects_processing_over_recording() {
        let mut app = ChatApp::new();
        assert_eq!(app.status_text(), "Ready to chat");

        app.recording = true;
        assert_eq!(app.status_text(), "Recording...");

        app.processing = true;
        assert_eq!(app.status_text(), "Processing...");
    }
}
