//! Raw chat messages and spaces as delivered by a message source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of chat container.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpaceType {
    #[default]
    Space,
    DirectMessage,
}

/// A chat container scoped for message retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    /// Resource name, e.g. `spaces/AAAA`
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub space_type: SpaceType,
}

impl Space {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            space_type: SpaceType::Space,
        }
    }

    /// Display name when present, resource name otherwise.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// The id segment of the resource name (`spaces/AAAA` -> `AAAA`).
    pub fn id(&self) -> &str {
        space_id(&self.name)
    }
}

/// Strip the `spaces/` prefix from a space resource name.
pub fn space_id(name: &str) -> &str {
    name.strip_prefix("spaces/").unwrap_or(name)
}

/// Normalize user input (`AAAA` or `spaces/AAAA`) to a space resource name.
pub fn space_name(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("spaces/") {
        trimmed.to_string()
    } else {
        format!("spaces/{trimmed}")
    }
}

/// One raw chat message. Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub id: String,
    #[serde(default)]
    pub text: String,
    /// Sender display name
    #[serde(default = "unknown_sender")]
    pub sender: String,
    pub create_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_name: Option<String>,
}

fn unknown_sender() -> String {
    "Unknown".to_string()
}

impl RawMessage {
    pub fn in_thread(&self, thread_name: &str) -> bool {
        self.thread_name.as_deref() == Some(thread_name)
    }
}

/// Expand a thread id into a full thread resource name when needed.
pub fn thread_name(space: &str, thread: &str) -> String {
    let trimmed = thread.trim();
    if trimmed.starts_with("spaces/") {
        trimmed.to_string()
    } else {
        format!("{}/threads/{trimmed}", space_name(space))
    }
}
