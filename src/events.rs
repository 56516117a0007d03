//! Event output for external integrations.
//!
//! Classified task events are emitted as JSON lines to stdout or a file.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classify::{TaskEvent, TaskEventKind};
use crate::error::{Error, Result};

pub const EVENT_SCHEMA_VERSION: &str = "chat-tasks.event.v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDestination {
    Stdout,
    File(PathBuf),
}

impl EventDestination {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            if trimmed == "-" {
                return Some(EventDestination::Stdout);
            }
            Some(EventDestination::File(PathBuf::from(trimmed)))
        })
    }

    pub fn open(&self) -> Result<EventSink> {
        match self {
            EventDestination::Stdout => Ok(EventSink::stdout()),
            EventDestination::File(path) => EventSink::file(path),
        }
    }
}

/// One classified event as written to the stream.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord<'a> {
    pub schema_version: &'static str,
    pub event: TaskEventKind,
    pub task_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<&'a str>,
    pub sender: &'a str,
    pub timestamp: DateTime<Utc>,
    pub space: &'a str,
    pub thread_name: &'a str,
    pub text: &'a str,
}

impl<'a> EventRecord<'a> {
    pub fn new(event: &'a TaskEvent, space: &'a str) -> Self {
        Self {
            schema_version: EVENT_SCHEMA_VERSION,
            event: event.kind,
            task_id: &event.task_id,
            assignee: event.assignee.as_deref(),
            sender: &event.sender,
            timestamp: event.timestamp,
            space,
            thread_name: &event.thread_name,
            text: &event.raw_text,
        }
    }
}

/// Event sink that writes JSONL output to a destination.
pub struct EventSink {
    writer: Box<dyn Write + Send>,
}

impl EventSink {
    /// Emit events to stdout.
    pub fn stdout() -> Self {
        Self {
            writer: Box::new(std::io::stdout()),
        }
    }

    /// Emit events to a file, creating it if necessary.
    pub fn file(path: &Path) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            writer: Box::new(file),
        })
    }

    #[cfg(test)]
    fn buffer(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }

    /// Write a single event as JSONL.
    pub fn emit(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let serialized = serde_json::to_vec(event)?;
        self.writer.write_all(&serialized)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush().map_err(Error::Io)?;
        Ok(())
    }

    /// Write every event of a space, returning how many were written.
    pub fn emit_all(&mut self, events: &[TaskEvent], space: &str) -> Result<usize> {
        for event in events {
            self.emit(&EventRecord::new(event, space))?;
        }
        Ok(events.len())
    }
}
