//! chat-tasks - task reports from chat task-bot messages
//!
//! The chat platform's task-bot posts free-text messages ("Created a task for
//! @X", "X Completed", ...) into the thread of each task. No task-state API is
//! available, so this library rebuilds the final state of every task from
//! those messages and reports on it.
//!
//! # Pipeline
//!
//! - **Source**: time-bounded, paginated message retrieval with retries
//! - **Classify**: one message to at most one lifecycle event
//! - **Reconstruct**: fold a space's events into final task records
//! - **Enrich**: optional thread context per task
//! - **Report**: completion table and per-assignee drill-down
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.chat-tasks.toml`
//! - `error`: Error types and result aliases
//! - `message`: Raw messages and spaces
//! - `source`: Message source trait, archive source, retry wrapper
//! - `retry`: Fixed-delay retry policy
//! - `window`: Report window resolution
//! - `classify`: Task-bot message classification
//! - `reconstruct`: Task state reconstruction
//! - `pattern`: Assignee glob and allow-list filtering
//! - `enrich`: Thread context lookups
//! - `collect`: Per-space collection with failure isolation
//! - `report`, `drilldown`: Report aggregation and rendering
//! - `people`: People seen in a window
//! - `export`: JSON and CSV files
//! - `events`: JSONL event stream
//! - `output`: Shared CLI output envelope

pub mod classify;
pub mod cli;
pub mod collect;
pub mod config;
pub mod drilldown;
pub mod enrich;
pub mod error;
pub mod events;
pub mod export;
pub mod message;
pub mod output;
pub mod pattern;
pub mod people;
pub mod reconstruct;
pub mod report;
pub mod retry;
pub mod source;
pub mod window;

pub use error::{Error, Result};
