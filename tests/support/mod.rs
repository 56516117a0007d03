#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::json;
use tempfile::TempDir;

/// Window covering every in-range fixture message.
pub const WINDOW: [&str; 4] = ["--date-start", "2024-05-01", "--date-end", "2024-06-01"];

/// A message archive in a temp dir, plus a config that disables retry delays.
pub struct TestArchive {
    dir: TempDir,
}

impl TestArchive {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        fs::create_dir_all(dir.path().join("archive").join("messages")).expect("mkdir");
        fs::write(
            dir.path().join(".chat-tasks.toml"),
            "[retry]\nattempts = 1\ndelay_secs = 0\n",
        )
        .expect("write config");
        Self { dir }
    }

    /// The fixture used by most CLI tests.
    ///
    /// Final state in May 2024: Bob Smith has T1 (completed), T2 and T4;
    /// Carol has T6 and T7 (completed). T3 is deleted and T5 falls outside
    /// the window.
    pub fn standard() -> Self {
        let archive = Self::new();
        archive.write_spaces(&[
            ("spaces/ENG", "Engineering", "SPACE"),
            ("spaces/OPS", "Ops", "SPACE"),
            ("spaces/DM1", "", "DIRECT_MESSAGE"),
        ]);
        archive.write_messages(
            "ENG",
            &[
                msg("ENG", "m0", "T5", "Zed", "Created a task for @Zed (via Tasks)", "2024-04-20T09:00:00Z"),
                msg("ENG", "m1", "T1", "Ann", "Fix the login page", "2024-05-02T09:00:00Z"),
                msg("ENG", "m2", "T1", "Ann", "Created a task for @Bob Smith (via Tasks)", "2024-05-02T09:01:00Z"),
                msg("ENG", "m3", "T1", "Bob Smith", "Bob Smith Completed (via Tasks)", "2024-05-03T10:00:00Z"),
                msg("ENG", "m4", "T3", "Ann", "Created a task for @Carol (via Tasks)", "2024-05-10T09:00:00Z"),
                msg("ENG", "m5", "T3", "Ann", "Ann Deleted a task (via Tasks)", "2024-05-11T09:00:00Z"),
                msg("ENG", "m6", "T2", "Ann", "Created a task for @Bob Smith (via Tasks)", "2024-05-27T09:00:00Z"),
                msg("ENG", "m7", "T4", "Ann", "Created a task for @Carol (via Tasks)", "2024-05-28T09:00:00Z"),
                msg("ENG", "m8", "T4", "Ann", "Assigned to @Bob Smith (via Tasks)", "2024-05-29T09:00:00Z"),
                "{not json".to_string(),
            ],
        );
        archive.write_messages(
            "OPS",
            &[
                msg("OPS", "o1", "T6", "Dan", "Created a task for @Carol (via Tasks)", "2024-05-15T09:00:00Z"),
                msg("OPS", "o2", "T7", "Dan", "Created a task for @Carol (via Tasks)", "2024-05-30T09:00:00Z"),
                msg("OPS", "o3", "T7", "Carol", "Carol Completed (via Tasks)", "2024-05-30T12:00:00Z"),
            ],
        );
        archive.write_messages(
            "DM1",
            &[msg("DM1", "d1", "X", "Eve", "private note", "2024-05-05T09:00:00Z")],
        );
        archive
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.dir.path().join("archive")
    }

    pub fn write_spaces(&self, spaces: &[(&str, &str, &str)]) {
        let list: Vec<_> = spaces
            .iter()
            .map(|(name, display, kind)| {
                let mut space = json!({ "name": name, "spaceType": kind });
                if !display.is_empty() {
                    space["displayName"] = json!(display);
                }
                space
            })
            .collect();
        fs::write(
            self.archive_dir().join("spaces.json"),
            serde_json::to_string_pretty(&list).expect("serialize"),
        )
        .expect("write spaces");
    }

    pub fn write_messages(&self, space_id: &str, lines: &[String]) {
        fs::write(
            self.archive_dir()
                .join("messages")
                .join(format!("{space_id}.jsonl")),
            lines.join("\n"),
        )
        .expect("write messages");
    }

    /// The binary, run inside the temp dir against this archive.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("chat-tasks").expect("binary");
        cmd.current_dir(self.path())
            .env_remove("CHAT_TASKS_ARCHIVE")
            .env_remove("RUST_LOG")
            .arg("--archive")
            .arg(self.archive_dir());
        cmd
    }
}

pub fn msg(space: &str, id: &str, thread: &str, sender: &str, text: &str, time: &str) -> String {
    json!({
        "id": format!("spaces/{space}/messages/{id}"),
        "text": text,
        "sender": sender,
        "createTime": time,
        "threadName": format!("spaces/{space}/threads/{thread}"),
    })
    .to_string()
}

pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is json")
}
