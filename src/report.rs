//! Per-assignee completion report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reconstruct::TaskRecord;

const ASSIGNEE_WIDTH: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssigneeReportRow {
    pub assignee: String,
    pub tasks_received: usize,
    pub tasks_completed: usize,
    pub completion_rate: f64,
}

impl AssigneeReportRow {
    /// Completion rate as a one-decimal percentage, e.g. `33.3%`.
    pub fn rate_label(&self) -> String {
        format_rate(self.completion_rate)
    }
}

pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Group records by assignee; rows are sorted by assignee name.
pub fn analyze(records: &[TaskRecord]) -> Vec<AssigneeReportRow> {
    if records.is_empty() {
        tracing::warn!("no tasks found to analyze");
        return Vec::new();
    }

    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = counts.entry(record.assignee.as_str()).or_default();
        entry.0 += 1;
        if record.is_completed() {
            entry.1 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(assignee, (received, completed))| AssigneeReportRow {
            assignee: assignee.to_string(),
            tasks_received: received,
            tasks_completed: completed,
            completion_rate: completion_rate(completed, received),
        })
        .collect()
}

pub fn completion_rate(completed: usize, received: usize) -> f64 {
    if received == 0 {
        0.0
    } else {
        completed as f64 / received as f64
    }
}

/// Fixed-width table for terminal output.
pub fn render_table(rows: &[AssigneeReportRow]) -> String {
    if rows.is_empty() {
        return "No tasks found in the report period.".to_string();
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "{:<30} {:<15} {:<17} {:<15}",
        "Assignee", "Tasks Received", "Tasks Completed", "Completion Rate"
    ));
    lines.push("-".repeat(80));
    for row in rows {
        let assignee: String = row.assignee.chars().take(ASSIGNEE_WIDTH - 1).collect();
        lines.push(format!(
            "{:<30} {:<15} {:<17} {:<15}",
            assignee,
            row.tasks_received,
            row.tasks_completed,
            row.rate_label()
        ));
    }
    lines.join("\n")
}
