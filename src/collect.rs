//! Per-space task collection.
//!
//! Each space is processed on its own: fetch, classify, reconstruct, drop
//! tasks the assignee pattern rejects, then enrich what is left. Spaces share
//! no state, so one failing space never taints another.

use serde::Serialize;

use crate::classify::Classifier;
use crate::enrich::{Enricher, ThreadMode};
use crate::error::Result;
use crate::message::Space;
use crate::pattern::{filter_by_assignee, AssigneePattern};
use crate::reconstruct::{reconstruct, TaskRecord};
use crate::source::MessageSource;
use crate::window::ReportWindow;

/// A space that could not be collected.
#[derive(Debug, Clone, Serialize)]
pub struct SpaceFailure {
    pub space: String,
    pub error: String,
}

/// Records from every space that succeeded, plus the failures.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Collection {
    pub records: Vec<TaskRecord>,
    pub failures: Vec<SpaceFailure>,
}

pub struct Collector<'a, S> {
    source: &'a S,
    classifier: &'a Classifier,
    thread_mode: ThreadMode,
    assignee: Option<&'a AssigneePattern>,
}

impl<'a, S: MessageSource> Collector<'a, S> {
    pub fn new(source: &'a S, classifier: &'a Classifier) -> Self {
        Self {
            source,
            classifier,
            thread_mode: ThreadMode::None,
            assignee: None,
        }
    }

    pub fn thread_mode(mut self, mode: ThreadMode) -> Self {
        self.thread_mode = mode;
        self
    }

    /// Skip enrichment for tasks whose final assignee does not match.
    pub fn assignee_filter(mut self, pattern: Option<&'a AssigneePattern>) -> Self {
        self.assignee = pattern;
        self
    }

    /// Collect the task records of one space.
    pub fn collect_space(&self, space: &str, window: &ReportWindow) -> Result<Vec<TaskRecord>> {
        let messages = self.source.list_messages(space, window)?;
        let events = self.classifier.classify_all(&messages);
        tracing::debug!(
            space,
            messages = messages.len(),
            events = events.len(),
            "classified messages"
        );

        let mut records = reconstruct(&events, space);
        if let Some(pattern) = self.assignee {
            records = filter_by_assignee(records, pattern);
        }

        Enricher::new(self.source, self.thread_mode).enrich_all(&mut records);
        Ok(records)
    }

    /// Collect several spaces. A space that fails is logged and skipped.
    pub fn collect_spaces(&self, spaces: &[Space], window: &ReportWindow) -> Collection {
        let mut collection = Collection::default();
        tracing::debug!(
            spaces = spaces.len(),
            start = %window.start_rfc3339(),
            end = %window.end_rfc3339(),
            "collecting tasks"
        );
        for space in spaces {
            tracing::info!(space = space.label(), "fetching tasks");
            match self.collect_space(&space.name, window) {
                Ok(records) => collection.records.extend(records),
                Err(err) => {
                    tracing::error!(space = space.label(), error = %err, "skipping space");
                    collection.failures.push(SpaceFailure {
                        space: space.name.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
        collection
    }
}
