//! Message source contract and implementations.
//!
//! The core only sees whole result sets: pagination happens behind
//! [`drain_pages`], and [`RetryingSource`] applies the retry policy at every
//! call boundary.
//!
//! # Archive layout
//!
//! ```text
//! <archive>/
//!   spaces.json               # optional list of spaces
//!   messages/
//!     <space-id>.jsonl        # one RawMessage per line, server order
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::message::{space_id, RawMessage, Space};
use crate::retry::RetryPolicy;
use crate::window::ReportWindow;

const SPACES_FILE: &str = "spaces.json";
const MESSAGES_DIR: &str = "messages";

/// Retrieval of raw chat messages.
pub trait MessageSource {
    /// All spaces visible to the caller, direct messages included.
    fn list_spaces(&self) -> Result<Vec<Space>>;

    /// Messages of `space` created within `window`, in server order.
    fn list_messages(&self, space: &str, window: &ReportWindow) -> Result<Vec<RawMessage>>;

    /// Messages of one thread, oldest first.
    fn list_thread_messages(&self, space: &str, thread_name: &str) -> Result<Vec<RawMessage>>;

    /// Oldest message of a thread.
    fn first_thread_message(&self, space: &str, thread_name: &str) -> Result<Option<RawMessage>> {
        Ok(self.list_thread_messages(space, thread_name)?.into_iter().next())
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// Follow page tokens until the listing is exhausted.
pub fn drain_pages<T, F>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = fetch(token.as_deref())?;
        items.extend(page.items);
        match page.next_page_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => return Ok(items),
        }
    }
}

#[derive(Debug, Clone)]
enum Query<'a> {
    Window(&'a ReportWindow),
    Thread(&'a str),
}

impl Query<'_> {
    fn accepts(&self, message: &RawMessage) -> bool {
        match self {
            Query::Window(window) => window.contains(message.create_time),
            Query::Thread(thread_name) => message.in_thread(thread_name),
        }
    }
}

/// Message source backed by an exported message archive on disk.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    root: PathBuf,
    page_size: usize,
}

impl ArchiveSource {
    pub fn open(root: impl Into<PathBuf>, page_size: usize) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::ArchiveNotFound(root));
        }
        Ok(Self {
            root,
            page_size: page_size.max(1),
        })
    }

    fn spaces_file(&self) -> PathBuf {
        self.root.join(SPACES_FILE)
    }

    fn messages_dir(&self) -> PathBuf {
        self.root.join(MESSAGES_DIR)
    }

    fn messages_file(&self, space: &str) -> PathBuf {
        self.messages_dir().join(format!("{}.jsonl", space_id(space)))
    }

    /// Read one page. The page token is the line number to resume from.
    fn fetch_page(&self, space: &str, query: &Query<'_>, token: Option<&str>) -> Result<Page<RawMessage>> {
        let path = self.messages_file(space);
        if !path.exists() {
            return Err(Error::SpaceNotFound(space.to_string()));
        }
        let offset = match token {
            Some(raw) => raw.parse::<usize>().map_err(|_| Error::Source {
                space: space.to_string(),
                message: format!("invalid page token '{raw}'"),
            })?,
            None => 0,
        };

        let reader = BufReader::new(File::open(&path)?);
        let mut items = Vec::new();
        let mut lines = reader.lines().enumerate().skip(offset);
        let mut next_line = None;

        for (line_no, line) in lines.by_ref() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut message: RawMessage = match serde_json::from_str(&line) {
                Ok(message) => message,
                Err(err) => {
                    tracing::warn!(
                        file = %path.display(),
                        line = line_no + 1,
                        error = %err,
                        "skipping malformed message"
                    );
                    continue;
                }
            };
            if message.space_name.is_none() {
                message.space_name = Some(space.to_string());
            }
            if query.accepts(&message) {
                items.push(message);
            }
            if items.len() >= self.page_size {
                next_line = Some(line_no + 1);
                break;
            }
        }

        // Only hand out a token if something is left to read.
        let next_page_token = match next_line {
            Some(line) if lines.next().is_some() => Some(line.to_string()),
            _ => None,
        };

        Ok(Page {
            items,
            next_page_token,
        })
    }

    fn spaces_from_files(&self) -> Result<Vec<Space>> {
        let dir = self.messages_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut spaces = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("jsonl") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                spaces.push(Space::new(format!("spaces/{stem}")));
            }
        }
        spaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(spaces)
    }
}

impl MessageSource for ArchiveSource {
    fn list_spaces(&self) -> Result<Vec<Space>> {
        let path = self.spaces_file();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            return Ok(serde_json::from_str(&content)?);
        }
        self.spaces_from_files()
    }

    fn list_messages(&self, space: &str, window: &ReportWindow) -> Result<Vec<RawMessage>> {
        let query = Query::Window(window);
        drain_pages(|token| self.fetch_page(space, &query, token))
    }

    fn list_thread_messages(&self, space: &str, thread_name: &str) -> Result<Vec<RawMessage>> {
        let query = Query::Thread(thread_name);
        let mut messages = drain_pages(|token| self.fetch_page(space, &query, token))?;
        messages.sort_by(|a, b| a.create_time.cmp(&b.create_time));
        tracing::debug!(thread = thread_name, count = messages.len(), "retrieved thread");
        Ok(messages)
    }
}

/// Wraps a source so every call goes through a retry policy.
#[derive(Debug, Clone)]
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: MessageSource> RetryingSource<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<S: MessageSource> MessageSource for RetryingSource<S> {
    fn list_spaces(&self) -> Result<Vec<Space>> {
        self.policy.run("list spaces", || self.inner.list_spaces())
    }

    fn list_messages(&self, space: &str, window: &ReportWindow) -> Result<Vec<RawMessage>> {
        self.policy
            .run("list messages", || self.inner.list_messages(space, window))
    }

    fn list_thread_messages(&self, space: &str, thread_name: &str) -> Result<Vec<RawMessage>> {
        self.policy.run("list thread messages", || {
            self.inner.list_thread_messages(space, thread_name)
        })
    }

    fn first_thread_message(&self, space: &str, thread_name: &str) -> Result<Option<RawMessage>> {
        self.policy.run("first thread message", || {
            self.inner.first_thread_message(space, thread_name)
        })
    }
}
