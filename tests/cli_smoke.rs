use assert_cmd::Command;
use predicates::str::contains;

mod support;

use support::TestArchive;

#[test]
fn help_works() {
    Command::cargo_bin("chat-tasks")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Reconstruct task lifecycle records from chat task-bot messages"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = [
        "spaces", "people", "report", "tasks", "messages", "thread", "events",
    ];

    for cmd in subcommands {
        Command::cargo_bin("chat-tasks")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn missing_archive_is_a_user_error() {
    let archive = TestArchive::new();
    Command::cargo_bin("chat-tasks")
        .expect("binary")
        .current_dir(archive.path())
        .env_remove("CHAT_TASKS_ARCHIVE")
        .arg("spaces")
        .assert()
        .code(2)
        .stderr(contains("no message archive"));
}

#[test]
fn nonexistent_archive_reports_hint() {
    let archive = TestArchive::new();
    Command::cargo_bin("chat-tasks")
        .expect("binary")
        .current_dir(archive.path())
        .env_remove("CHAT_TASKS_ARCHIVE")
        .args(["--archive", "does-not-exist", "spaces"])
        .assert()
        .code(2)
        .stderr(contains("Message archive not found"))
        .stderr(contains("hint:"));
}

#[test]
fn json_errors_use_the_envelope() {
    let archive = TestArchive::standard();
    let output = archive
        .cmd()
        .args(["--json", "report", "--date-start", "2024-05-01"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(2));
    let value = support::stdout_json(&output);
    assert_eq!(value["schema_version"], "chat-tasks.v1");
    assert_eq!(value["command"], "report");
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["kind"], "user_error");
}

#[test]
fn invalid_config_is_rejected() {
    let archive = TestArchive::standard();
    std::fs::write(
        archive.path().join(".chat-tasks.toml"),
        "[classifier]\nmarker = \"\"\n",
    )
    .expect("write config");
    archive
        .cmd()
        .arg("spaces")
        .assert()
        .code(2)
        .stderr(contains("classifier.marker"));
}
