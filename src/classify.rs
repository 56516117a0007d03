//! Task-bot message classification.
//!
//! The task-bot only emits human-readable sentences, so lifecycle events are
//! recovered by substring matching. The kind checks run in a fixed order:
//! creation messages also carry assignee-shaped text, so `Created` must win
//! over `Assigned`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::RawMessage;

/// Marker the task-bot appends to every message it sends.
pub const DEFAULT_MARKER: &str = "via Tasks";

/// Assignee used when no event names one.
pub const UNASSIGNED: &str = "Unassigned";

/// Index of the task id within `spaces/{space}/threads/{task}`.
const TASK_ID_SEGMENT: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    Created,
    Assigned,
    Completed,
    Deleted,
    ReOpened,
    Other,
}

/// Substring checks in priority order; the first hit decides the kind.
const KIND_PRIORITY: [(&str, TaskEventKind); 5] = [
    ("Created", TaskEventKind::Created),
    ("Assigned", TaskEventKind::Assigned),
    ("Completed", TaskEventKind::Completed),
    ("Deleted", TaskEventKind::Deleted),
    ("Re-opened", TaskEventKind::ReOpened),
];

/// A lifecycle event derived from one task-bot message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskEvent {
    pub kind: TaskEventKind,
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
    pub raw_text: String,
    /// Thread the event was posted in
    pub thread_name: String,
}

impl TaskEvent {
    pub fn assignee_or_default(&self) -> &str {
        self.assignee.as_deref().unwrap_or(UNASSIGNED)
    }
}

/// Maps raw messages to task events.
#[derive(Debug, Clone)]
pub struct Classifier {
    marker: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl Classifier {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Whether the message was written by the task-bot.
    pub fn is_task_message(&self, message: &RawMessage) -> bool {
        message.text.contains(&self.marker)
    }

    /// Classify one message. Returns `None` for ordinary chat and for
    /// task-bot messages whose thread name carries no task id.
    pub fn classify(&self, message: &RawMessage) -> Option<TaskEvent> {
        if !self.is_task_message(message) {
            return None;
        }

        let Some(thread_name) = message.thread_name.as_deref() else {
            tracing::debug!(message = %message.id, "task message without thread name");
            return None;
        };
        let Some(task_id) = task_id_from_thread(thread_name) else {
            tracing::debug!(
                message = %message.id,
                thread = thread_name,
                "task message with malformed thread name"
            );
            return None;
        };

        Some(TaskEvent {
            kind: classify_kind(&message.text),
            task_id: task_id.to_string(),
            assignee: extract_assignee(&message.text),
            sender: message.sender.clone(),
            timestamp: message.create_time,
            raw_text: message.text.clone(),
            thread_name: thread_name.to_string(),
        })
    }

    /// Classify a batch, preserving arrival order.
    pub fn classify_all<'a, I>(&self, messages: I) -> Vec<TaskEvent>
    where
        I: IntoIterator<Item = &'a RawMessage>,
    {
        messages
            .into_iter()
            .filter_map(|message| self.classify(message))
            .collect()
    }
}

pub fn classify_kind(text: &str) -> TaskEventKind {
    KIND_PRIORITY
        .iter()
        .find(|(needle, _)| text.contains(needle))
        .map(|(_, kind)| *kind)
        .unwrap_or(TaskEventKind::Other)
}

/// Task id from a thread resource name, if the name has a fourth segment.
pub fn task_id_from_thread(thread_name: &str) -> Option<&str> {
    thread_name
        .split('/')
        .nth(TASK_ID_SEGMENT)
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// Name after the first `@`, cut at the next `@` or `(`, with a trailing
/// `" to"` removed ("Assigned to @Name (" and "from @A to @B (").
pub fn extract_assignee(text: &str) -> Option<String> {
    let (_, rest) = text.split_once('@')?;
    let segment = rest.split('@').next().unwrap_or(rest);
    let segment = segment.split('(').next().unwrap_or(segment).trim();
    let name = segment.strip_suffix(" to").unwrap_or(segment).trim();
    Some(name.to_string())
}
