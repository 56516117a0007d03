//! Directory of people seen in a report window.

use std::collections::BTreeSet;

use crate::classify::{extract_assignee, Classifier};
use crate::message::{Space, SpaceType};
use crate::source::MessageSource;
use crate::window::ReportWindow;

/// Unique senders and task assignees across the SPACE-type spaces, sorted.
///
/// Direct messages are ignored. A space that fails is logged and skipped.
pub fn collect_people<S: MessageSource>(
    source: &S,
    spaces: &[Space],
    window: &ReportWindow,
    classifier: &Classifier,
) -> Vec<String> {
    let mut people = BTreeSet::new();

    for space in spaces.iter().filter(|s| s.space_type == SpaceType::Space) {
        let messages = match source.list_messages(&space.name, window) {
            Ok(messages) => messages,
            Err(err) => {
                tracing::error!(space = space.label(), error = %err, "skipping space");
                continue;
            }
        };
        for message in &messages {
            if !message.sender.is_empty() {
                people.insert(message.sender.clone());
            }
            if !classifier.is_task_message(message) {
                continue;
            }
            // No thread needed: a bot message without a task id still names someone.
            if let Some(assignee) =
                extract_assignee(&message.text).filter(|name| !name.is_empty())
            {
                people.insert(assignee);
            }
        }
    }

    tracing::info!(count = people.len(), "collected people");
    people.into_iter().collect()
}
