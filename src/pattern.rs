//! Assignee matching and record filters.
//!
//! Patterns are Unix shell globs matched case-sensitively against the whole
//! assignee name. Collection and reporting both use
//! [`AssigneePattern::matches`].

use std::collections::HashSet;

use glob::{MatchOptions, Pattern};

use crate::error::{Error, Result};
use crate::reconstruct::TaskRecord;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
pub struct AssigneePattern {
    raw: String,
    matcher: Pattern,
}

impl AssigneePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern cannot be empty".to_string(),
            });
        }
        let matcher = Pattern::new(pattern).map_err(|err| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            matcher,
        })
    }

    /// Parse an optional CLI value.
    pub fn parse_opt(pattern: Option<&str>) -> Result<Option<Self>> {
        pattern.map(Self::new).transpose()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, assignee: &str) -> bool {
        self.matcher.matches_with(assignee, MATCH_OPTIONS)
    }
}

/// True when there is no pattern or the pattern matches.
pub fn matches_opt(pattern: Option<&AssigneePattern>, assignee: &str) -> bool {
    pattern.map_or(true, |pattern| pattern.matches(assignee))
}

/// Keep records whose assignee matches the pattern.
pub fn filter_by_assignee(records: Vec<TaskRecord>, pattern: &AssigneePattern) -> Vec<TaskRecord> {
    records
        .into_iter()
        .filter(|record| pattern.matches(&record.assignee))
        .collect()
}

/// Restrict records to known people and spaces.
///
/// People are compared case-insensitively, spaces exactly. An empty list
/// disables that check.
pub fn filter_records(records: Vec<TaskRecord>, people: &[String], spaces: &[String]) -> Vec<TaskRecord> {
    let people: HashSet<String> = people.iter().map(|person| person.to_lowercase()).collect();
    let spaces: HashSet<&str> = spaces.iter().map(String::as_str).collect();

    records
        .into_iter()
        .filter(|record| {
            let person_ok = people.is_empty() || people.contains(&record.assignee.to_lowercase());
            let space_ok = spaces.is_empty() || spaces.contains(record.space_name.as_str());
            person_ok && space_ok
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconstruct::TaskStatus;

    fn record(id: &str, assignee: &str, space: &str) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            assignee: assignee.to_string(),
            status: TaskStatus::Open,
            created_time: "2024-05-01T10:00:00Z".parse().expect("time"),
            space_name: space.to_string(),
            sender: "Bot".to_string(),
            thread_name: format!("{space}/threads/{id}"),
            message_text: String::new(),
            first_thread_message: None,
            thread_messages: None,
        }
    }

    #[test]
    fn glob_is_case_sensitive() {
        let lower = AssigneePattern::new("*oe*").expect("pattern");
        assert!(lower.matches("John Doe"));
        assert!(!lower.matches("John D"));

        let upper = AssigneePattern::new("*OE*").expect("pattern");
        assert!(!upper.matches("John Doe"));
    }

    #[test]
    fn glob_matches_whole_name() {
        let pattern = AssigneePattern::new("Ann").expect("pattern");
        assert!(pattern.matches("Ann"));
        assert!(!pattern.matches("Anna"));

        let single = AssigneePattern::new("An?").expect("pattern");
        assert!(single.matches("Ann"));
        assert!(!single.matches("Anne"));
    }

    #[test]
    fn slashes_in_names_are_not_special() {
        let pattern = AssigneePattern::new("*Ops*").expect("pattern");
        assert!(pattern.matches("Dev/Ops Team"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = AssigneePattern::new("[abc").expect_err("invalid");
        assert!(matches!(err, Error::InvalidPattern { .. }));
        assert!(AssigneePattern::new("").is_err());
    }

    #[test]
    fn filter_records_uses_people_and_spaces() {
        let records = vec![
            record("T1", "Ann Lee", "spaces/A"),
            record("T2", "Bob", "spaces/A"),
            record("T3", "ann lee", "spaces/B"),
        ];
        let people = vec!["ANN LEE".to_string()];
        let spaces = vec!["spaces/A".to_string()];

        let kept = filter_records(records.clone(), &people, &spaces);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "T1");

        let any_space = filter_records(records.clone(), &people, &[]);
        assert_eq!(any_space.len(), 2);

        assert_eq!(filter_records(records, &[], &[]).len(), 3);
    }

    #[test]
    fn filter_by_assignee_drops_non_matches() {
        let pattern = AssigneePattern::new("B*").expect("pattern");
        let kept = filter_by_assignee(
            vec![record("T1", "Ann", "spaces/A"), record("T2", "Bob", "spaces/A")],
            &pattern,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].assignee, "Bob");
        assert!(matches_opt(None, "anyone"));
    }
}
