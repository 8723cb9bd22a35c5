use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bfckr").unwrap();
    cmd.timeout(Duration::from_secs(5));
    cmd
}

#[test]
fn keeps_only_instruction_characters() {
    cargo_bin()
        .args(["strip", "add 2: ++ then # print ."])
        .assert()
        .success()
        .stdout("++#.\n");
}

#[test]
fn strips_file_without_length_limit() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", "+ ".repeat(20_000)).unwrap();
    cargo_bin()
        .env("BFCKR_MAX_PROGRAM", "1")
        .args(["strip", "--file"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(format!("{}\n", "+".repeat(20_000)));
}

#[test]
fn unbalanced_brackets_are_kept() {
    cargo_bin()
        .args(["strip", "[[x]"])
        .assert()
        .success()
        .stdout("[[]\n");
}

#[test]
fn top_level_help_lists_subcommands() {
    cargo_bin()
        .arg("--help")
        .assert()
        .success()
        .stderr(predicate::str::contains("run").and(predicate::str::contains("strip")));
}
