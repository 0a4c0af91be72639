use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single chat message as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// The backend stores wall-clock timestamps and serializes them as
/// ISO 8601 without a UTC offset (`2025-06-01T12:30:00.123456`). Accept
/// both the offset-carrying and the naive form, reading naive as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(serde::de::Error::custom)
}

impl Message {
    /// Message time formatted for display in the thread (`HH:MM`, local)
    pub fn local_time(&self) -> String {
        self.timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string()
    }
}

/// Reply to a voice or text upload: both new messages, user first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub user_message: Message,
    pub assistant_message: Message,
}

/// Structured error payload on non-success responses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
