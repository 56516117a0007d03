//! Per-assignee drill-down view.
//!
//! "Closed this week" is approximated: the event stream never records when a
//! task was completed, so a task counts as closed this week when it is
//! completed and was *created* in the last seven days of the window.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pattern::{matches_opt, AssigneePattern};
use crate::reconstruct::{TaskRecord, TaskStatus};
use crate::window::ReportWindow;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DrillDownTask {
    pub task_id: String,
    pub created_time: DateTime<Utc>,
    pub first_message: String,
    pub space: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DrillDownEntry {
    pub assignee: String,
    pub tasks_assigned_this_week: Vec<DrillDownTask>,
    pub tasks_closed_this_week: Vec<DrillDownTask>,
    pub total_tasks: usize,
    pub total_completed: usize,
}

impl DrillDownEntry {
    fn new(assignee: &str) -> Self {
        Self {
            assignee: assignee.to_string(),
            tasks_assigned_this_week: Vec::new(),
            tasks_closed_this_week: Vec::new(),
            total_tasks: 0,
            total_completed: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DrillDownReport {
    pub window: ReportWindow,
    pub week_start: DateTime<Utc>,
    pub entries: Vec<DrillDownEntry>,
}

/// Build the drill-down report. Entries are ordered by assignee.
pub fn drill_down(
    records: &[TaskRecord],
    window: &ReportWindow,
    pattern: Option<&AssigneePattern>,
) -> DrillDownReport {
    let week_start = window.week_start();
    let mut grouped: BTreeMap<&str, DrillDownEntry> = BTreeMap::new();

    for record in records {
        if !matches_opt(pattern, &record.assignee) {
            continue;
        }
        let entry = grouped
            .entry(record.assignee.as_str())
            .or_insert_with(|| DrillDownEntry::new(&record.assignee));

        entry.total_tasks += 1;
        if record.is_completed() {
            entry.total_completed += 1;
        }

        let this_week = record.created_time >= week_start && record.created_time <= window.end;
        if !this_week {
            continue;
        }
        let first_message = record.first_thread_message.clone().unwrap_or_default();
        entry.tasks_assigned_this_week.push(DrillDownTask {
            task_id: record.id.clone(),
            created_time: record.created_time,
            first_message: first_message.clone(),
            space: record.space_name.clone(),
            status: Some(record.status),
        });
        if record.is_completed() {
            entry.tasks_closed_this_week.push(DrillDownTask {
                task_id: record.id.clone(),
                created_time: record.created_time,
                first_message,
                space: record.space_name.clone(),
                status: None,
            });
        }
    }

    DrillDownReport {
        window: *window,
        week_start,
        entries: grouped.into_values().collect(),
    }
}

/// Human rendering of the drill-down view.
pub fn render(report: &DrillDownReport) -> String {
    let rule = "=".repeat(80);
    let mut lines = vec![
        rule.clone(),
        "TASK REPORT - DRILL-DOWN VIEW".to_string(),
        format!("Period: {}", report.window.label()),
        rule.clone(),
    ];

    if report.entries.is_empty() {
        lines.push(String::new());
        lines.push("No tasks found in the report period.".to_string());
    }

    for entry in &report.entries {
        lines.push(String::new());
        lines.push(format!("ASSIGNEE: {}", entry.assignee));
        lines.push("-".repeat(80));
        lines.push(format!(
            "Total tasks: {} ({} completed)",
            entry.total_tasks, entry.total_completed
        ));
        lines.push(format!(
            "Tasks assigned in past week: {}",
            entry.tasks_assigned_this_week.len()
        ));
        for (idx, task) in entry.tasks_assigned_this_week.iter().enumerate() {
            let status = task.status.map(|s| s.as_str()).unwrap_or("UNKNOWN");
            lines.push(format!(
                "  {}. [{}] {} ({})",
                idx + 1,
                status,
                summarize(&task.first_message),
                task.created_time.format("%Y-%m-%d")
            ));
        }
        lines.push(format!(
            "Tasks closed in past week: {}",
            entry.tasks_closed_this_week.len()
        ));
        for (idx, task) in entry.tasks_closed_this_week.iter().enumerate() {
            lines.push(format!("  {}. {}", idx + 1, summarize(&task.first_message)));
        }
    }
    lines.push(String::new());
    lines.push(rule);
    lines.join("\n")
}

fn summarize(text: &str) -> String {
    const LIMIT: usize = 100;
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.is_empty() {
        return "(no context)".to_string();
    }
    if single_line.chars().count() > LIMIT {
        let cut: String = single_line.chars().take(LIMIT).collect();
        format!("{cut}...")
    } else {
        single_line
    }
}
