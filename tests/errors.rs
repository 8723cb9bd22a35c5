use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bfckr").unwrap();
    cmd.env("BFCKR_CONFIG", "/nonexistent/bfckr.toml");
    cmd.timeout(Duration::from_secs(5));
    cmd
}

#[test]
fn unmatched_open_bracket_reports_position() {
    cargo_bin()
        .args(["run", "["])
        .assert()
        .failure()
        .code(1)
        .stderr(
            predicate::str::contains("unmatched bracket '[' at instruction 0")
                .and(predicate::str::contains("^")),
        );
}

#[test]
fn unmatched_close_bracket_reports_filtered_position() {
    // Comments are dropped, so the ']' is instruction 1
    cargo_bin()
        .args(["run", "+ comment ]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unmatched bracket ']' at instruction 1"));
}

#[test]
fn unreached_unmatched_bracket_is_not_an_error() {
    // The loop body is skipped only by jumping, and ']' with a zero cell falls through
    cargo_bin()
        .args(["run", "+.-]"])
        .assert()
        .success()
        .stdout("\u{1}\n");
}

#[test]
fn output_before_the_error_is_flushed() {
    // The cell is back to 0 at '[', so the forward scan runs and fails
    cargo_bin()
        .args(["run", "+++.---["])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::starts_with("\u{3}"))
        .stderr(predicate::str::contains("unmatched bracket '['"));
}

#[test]
fn loop_entered_at_an_unmatched_open_bracket_just_ends() {
    // A nonzero cell at '[' never looks for the partner
    cargo_bin()
        .args(["run", "+++.["])
        .assert()
        .success()
        .stdout("\u{3}\n");
}

#[test]
fn program_too_long_is_a_load_error() {
    cargo_bin()
        .args(["run", "--max-len", "3", "++++"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Load error: Program too long: 4 instructions (max 3)"));
}

#[test]
fn comments_do_not_count_towards_length() {
    cargo_bin()
        .args(["run", "--max-len", "3", "a + b + c + ."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Program too long: 4"));

    cargo_bin()
        .args(["run", "--max-len", "3", "a + b + c ."])
        .assert()
        .success()
        .stdout("\u{2}\n");
}

#[test]
fn missing_file_is_reported() {
    cargo_bin()
        .args(["run", "--file", "/definitely/not/here.bf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read code file"));
}
