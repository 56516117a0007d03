//! Task state reconstruction.
//!
//! Events are folded in two passes. The first pass only records what happened
//! (baseline records from `Created`, assignment pairs, and id sets for the
//! terminal markers); the second pass resolves each baseline record against
//! those facts. Set membership decides status, not timestamps, and the last
//! assignment in arrival order decides the assignee.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{TaskEvent, TaskEventKind};
use crate::enrich::ThreadEntry;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Open,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "OPEN",
            TaskStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: String,
    pub assignee: String,
    pub status: TaskStatus,
    pub created_time: DateTime<Utc>,
    pub space_name: String,
    /// Sender of the creating message
    pub sender: String,
    pub thread_name: String,
    pub message_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_thread_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_messages: Option<Vec<ThreadEntry>>,
}

impl TaskRecord {
    fn from_created(event: &TaskEvent, space_name: &str) -> Self {
        Self {
            id: event.task_id.clone(),
            assignee: event.assignee_or_default().to_string(),
            status: TaskStatus::Open,
            created_time: event.timestamp,
            space_name: space_name.to_string(),
            sender: event.sender.clone(),
            thread_name: event.thread_name.clone(),
            message_text: event.raw_text.clone(),
            first_thread_message: None,
            thread_messages: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Facts gathered by the first pass.
#[derive(Debug, Default)]
struct Ledger {
    /// Task ids in the order their `Created` event arrived
    order: Vec<String>,
    baseline: HashMap<String, TaskRecord>,
    assignments: Vec<(String, String)>,
    completed: HashSet<String>,
    reopened: HashSet<String>,
    deleted: HashSet<String>,
}

impl Ledger {
    fn observe(&mut self, event: &TaskEvent, space_name: &str) {
        let id = &event.task_id;
        match event.kind {
            TaskEventKind::Created => {
                if self.baseline.contains_key(id) {
                    tracing::debug!(task = %id, "duplicate create event ignored");
                    return;
                }
                self.order.push(id.clone());
                self.baseline
                    .insert(id.clone(), TaskRecord::from_created(event, space_name));
            }
            TaskEventKind::Assigned => {
                self.assignments
                    .push((id.clone(), event.assignee_or_default().to_string()));
            }
            TaskEventKind::Completed => {
                self.completed.insert(id.clone());
            }
            TaskEventKind::ReOpened => {
                self.reopened.insert(id.clone());
            }
            TaskEventKind::Deleted => {
                self.deleted.insert(id.clone());
            }
            TaskEventKind::Other => {}
        }
    }

    fn reconcile(mut self) -> Vec<TaskRecord> {
        let mut latest_assignee: HashMap<&str, &str> = HashMap::new();
        for (task_id, assignee) in &self.assignments {
            latest_assignee.insert(task_id.as_str(), assignee.as_str());
        }

        let mut records = Vec::with_capacity(self.order.len());
        for id in &self.order {
            if self.deleted.contains(id) {
                continue;
            }
            let Some(mut record) = self.baseline.remove(id) else {
                continue;
            };
            if let Some(assignee) = latest_assignee.get(id.as_str()) {
                record.assignee = (*assignee).to_string();
            }
            if self.completed.contains(id) {
                record.status = TaskStatus::Completed;
            } else if self.reopened.contains(id) {
                record.status = TaskStatus::Open;
            }
            records.push(record);
        }
        records
    }
}

/// Fold one space's events, given in arrival order, into final task records.
///
/// Records come back in creation arrival order. Ids with a `Deleted` event are
/// omitted no matter where the deletion arrived.
pub fn reconstruct(events: &[TaskEvent], space_name: &str) -> Vec<TaskRecord> {
    let mut ledger = Ledger::default();
    for event in events {
        ledger.observe(event, space_name);
    }
    ledger.reconcile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(kind: TaskEventKind, id: &str, assignee: Option<&str>, offset: i64) -> TaskEvent {
        let base: DateTime<Utc> = "2024-05-01T10:00:00Z".parse().expect("time");
        TaskEvent {
            kind,
            task_id: id.to_string(),
            assignee: assignee.map(str::to_string),
            sender: "Bot".to_string(),
            timestamp: base + Duration::minutes(offset),
            raw_text: format!("{kind:?} via Tasks"),
            thread_name: format!("spaces/S/threads/{id}"),
        }
    }

    fn permutations(items: &[TaskEvent]) -> Vec<Vec<TaskEvent>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for idx in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(idx);
            for mut tail in permutations(&rest) {
                tail.insert(0, head.clone());
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn created_task_starts_open() {
        let events = vec![event(TaskEventKind::Created, "T1", Some("Ann"), 0)];
        let records = reconstruct(&events, "spaces/S");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].assignee, "Ann");
        assert_eq!(records[0].status, TaskStatus::Open);
        assert_eq!(records[0].space_name, "spaces/S");
        assert_eq!(records[0].thread_name, "spaces/S/threads/T1");
    }

    #[test]
    fn completed_dominates_reopened_in_either_order() {
        let created = event(TaskEventKind::Created, "T1", Some("Ann"), 0);
        let reopened = event(TaskEventKind::ReOpened, "T1", None, 1);
        let completed = event(TaskEventKind::Completed, "T1", None, 2);

        let forward = vec![created.clone(), reopened.clone(), completed.clone()];
        let backward = vec![created, completed, reopened];
        assert_eq!(reconstruct(&forward, "S")[0].status, TaskStatus::Completed);
        assert_eq!(reconstruct(&backward, "S")[0].status, TaskStatus::Completed);
    }

    #[test]
    fn reopened_without_completion_stays_open() {
        let events = vec![
            event(TaskEventKind::Created, "T1", Some("Ann"), 0),
            event(TaskEventKind::ReOpened, "T1", None, 1),
        ];
        assert_eq!(reconstruct(&events, "S")[0].status, TaskStatus::Open);
    }

    #[test]
    fn deletion_wins_for_every_arrival_order() {
        let items = vec![
            event(TaskEventKind::Created, "T1", Some("Ann"), 0),
            event(TaskEventKind::Deleted, "T1", None, 1),
            event(TaskEventKind::Completed, "T1", None, 2),
        ];
        let orders = permutations(&items);
        assert_eq!(orders.len(), 6);
        for order in orders {
            assert!(reconstruct(&order, "S").is_empty());
        }
    }

    #[test]
    fn last_assignment_by_arrival_wins() {
        let events = vec![
            event(TaskEventKind::Created, "T1", Some("A"), 0),
            // B carries the later timestamp but arrives first
            event(TaskEventKind::Assigned, "T1", Some("B"), 30),
            event(TaskEventKind::Assigned, "T1", Some("C"), 10),
        ];
        assert_eq!(reconstruct(&events, "S")[0].assignee, "C");
    }

    #[test]
    fn assignment_before_creation_still_applies() {
        let events = vec![
            event(TaskEventKind::Assigned, "T1", Some("Bob"), 5),
            event(TaskEventKind::Created, "T1", Some("Ann"), 0),
        ];
        assert_eq!(reconstruct(&events, "S")[0].assignee, "Bob");
    }

    #[test]
    fn neighbours_of_deleted_tasks_are_still_reconciled() {
        let events = vec![
            event(TaskEventKind::Created, "T1", Some("Ann"), 0),
            event(TaskEventKind::Created, "T2", Some("Bob"), 1),
            event(TaskEventKind::Created, "T3", Some("Cid"), 2),
            event(TaskEventKind::Deleted, "T1", None, 3),
            event(TaskEventKind::Completed, "T2", None, 4),
            event(TaskEventKind::Assigned, "T2", Some("Dee"), 5),
        ];
        let records = reconstruct(&events, "S");
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["T2", "T3"]);
        assert_eq!(records[0].status, TaskStatus::Completed);
        assert_eq!(records[0].assignee, "Dee");
    }

    #[test]
    fn duplicate_creates_keep_first() {
        let events = vec![
            event(TaskEventKind::Created, "T1", Some("Ann"), 0),
            event(TaskEventKind::Created, "T1", Some("Bob"), 1),
        ];
        let records = reconstruct(&events, "S");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].assignee, "Ann");
    }

    #[test]
    fn events_for_unknown_tasks_produce_nothing() {
        let events = vec![
            event(TaskEventKind::Completed, "T7", None, 0),
            event(TaskEventKind::Assigned, "T7", Some("Ann"), 1),
            event(TaskEventKind::Other, "T7", None, 2),
        ];
        assert!(reconstruct(&events, "S").is_empty());
    }

    #[test]
    fn created_without_assignee_defaults() {
        let events = vec![event(TaskEventKind::Created, "T1", None, 0)];
        assert_eq!(reconstruct(&events, "S")[0].assignee, "Unassigned");
    }
}
