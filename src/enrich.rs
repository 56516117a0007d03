//! Thread context for reconstructed tasks.
//!
//! `Created` messages carry no task title, so the only human-readable context
//! is the thread the task lives in. Lookups are best effort: a failing thread
//! leaves its task with empty context and the batch carries on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::RawMessage;
use crate::reconstruct::TaskRecord;
use crate::source::MessageSource;

/// How much thread context to attach to each task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThreadMode {
    /// No lookups
    None,
    /// First thread message only
    #[default]
    Context,
    /// First message plus the whole thread
    Full,
}

impl std::str::FromStr for ThreadMode {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(ThreadMode::None),
            "context" => Ok(ThreadMode::Context),
            "full" => Ok(ThreadMode::Full),
            _ => Err(crate::error::Error::InvalidArgument(format!(
                "invalid thread mode '{}': must be none, context, or full",
                s
            ))),
        }
    }
}

/// Simplified thread message attached in full mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreadEntry {
    pub date: DateTime<Utc>,
    pub sender: String,
    pub message: String,
}

impl From<&RawMessage> for ThreadEntry {
    fn from(message: &RawMessage) -> Self {
        Self {
            date: message.create_time,
            sender: message.sender.clone(),
            message: message.text.clone(),
        }
    }
}

/// Summary of one thread.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ThreadInfo {
    pub thread_name: String,
    pub message_count: usize,
    pub first_message_text: String,
    pub thread_starter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ThreadEntry>,
}

/// Fetch and summarize a thread.
pub fn thread_info<S: MessageSource>(source: &S, space: &str, thread_name: &str) -> Result<ThreadInfo> {
    let messages = source.list_thread_messages(space, thread_name)?;
    let first = messages.first();
    Ok(ThreadInfo {
        thread_name: thread_name.to_string(),
        message_count: messages.len(),
        first_message_text: first.map(|m| m.text.clone()).unwrap_or_default(),
        thread_starter: first.map(|m| m.sender.clone()).unwrap_or_default(),
        last_message_time: messages.last().map(|m| m.create_time),
        messages: messages.iter().map(ThreadEntry::from).collect(),
    })
}

/// Attaches thread context to task records.
pub struct Enricher<'a, S> {
    source: &'a S,
    mode: ThreadMode,
}

impl<'a, S: MessageSource> Enricher<'a, S> {
    pub fn new(source: &'a S, mode: ThreadMode) -> Self {
        Self { source, mode }
    }

    /// Enrich every record in place, reporting progress every ten tasks.
    pub fn enrich_all(&self, records: &mut [TaskRecord]) {
        if self.mode == ThreadMode::None || records.is_empty() {
            return;
        }
        let total = records.len();
        match self.mode {
            ThreadMode::Full => tracing::info!(total, "fetching complete threads"),
            _ => tracing::info!(total, "fetching task context"),
        }
        for (idx, record) in records.iter_mut().enumerate() {
            self.enrich(record);
            if (idx + 1) % 10 == 0 {
                tracing::info!(done = idx + 1, total, "enriching tasks");
            }
        }
    }

    /// Enrich one record. Failures leave empty context behind.
    pub fn enrich(&self, record: &mut TaskRecord) {
        if self.mode == ThreadMode::None {
            return;
        }

        let first = match self
            .source
            .first_thread_message(&record.space_name, &record.thread_name)
        {
            Ok(first) => first.map(|message| message.text).unwrap_or_default(),
            Err(err) => {
                tracing::warn!(
                    task = %record.id,
                    thread = %record.thread_name,
                    error = %err,
                    "could not retrieve first thread message"
                );
                String::new()
            }
        };
        record.first_thread_message = Some(first);

        if self.mode == ThreadMode::Full {
            let entries = match self
                .source
                .list_thread_messages(&record.space_name, &record.thread_name)
            {
                Ok(messages) => messages.iter().map(ThreadEntry::from).collect(),
                Err(err) => {
                    tracing::warn!(
                        task = %record.id,
                        thread = %record.thread_name,
                        error = %err,
                        "could not retrieve thread messages"
                    );
                    Vec::new()
                }
            };
            record.thread_messages = Some(entries);
        }
    }
}
