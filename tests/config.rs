use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bfckr").unwrap();
    cmd.env("BFCKR_CONFIG", "/nonexistent/bfckr.toml");
    cmd.timeout(Duration::from_secs(5));
    cmd
}

#[test]
fn invalid_env_value_is_a_usage_error() {
    cargo_bin()
        .env("BFCKR_TAPE_SIZE", "lots")
        .args(["run", "+."])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value for BFCKR_TAPE_SIZE: 'lots'"));
}

#[test]
fn zero_tape_size_is_rejected() {
    cargo_bin()
        .args(["run", "--tape-size", "0", "+."])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("tape_size must be greater than zero"));
}

#[test]
fn tape_size_flag_overrides_invalid_env_value() {
    cargo_bin()
        .env("BFCKR_TAPE_SIZE", "0")
        .args(["run", "--tape-size", "5", "+."])
        .assert()
        .success()
        .stdout("\u{1}\n");
}

#[test]
fn unreadable_explicit_config_file_is_reported() {
    cargo_bin()
        .env_remove("BFCKR_LOG")
        .env("BFCKR_CONFIG", "/nonexistent/dir/bfckr.toml")
        .args(["run", "+."])
        .assert()
        .success()
        .stdout("\u{1}\n")
        .stderr(predicate::str::contains("cannot read config file /nonexistent/dir/bfckr.toml"));
}

#[test]
fn env_step_limit_applies() {
    cargo_bin()
        .env("BFCKR_MAX_STEPS", "20")
        .args(["run", "+[]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (20)"));
}

#[test]
fn flag_overrides_env() {
    cargo_bin()
        .env("BFCKR_MAX_PROGRAM", "1")
        .args(["run", "--max-len", "5", "+++."])
        .assert()
        .success()
        .stdout("\u{3}\n");
}

#[test]
fn config_file_sets_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[vm]\nmax_program_len = 2\ncontinue_key = \"x\"\n\n[colors]\nheading = \"red\"").unwrap();

    cargo_bin()
        .env("BFCKR_CONFIG", file.path())
        .args(["run", "+++"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("(max 2)"));

    cargo_bin()
        .env("BFCKR_CONFIG", file.path())
        .args(["run", "#."])
        .write_stdin("x")
        .assert()
        .success()
        .stderr(predicate::str::contains("[x] continue"));
}

#[test]
fn env_overrides_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[vm]\nstart_paused = true").unwrap();

    cargo_bin()
        .env("BFCKR_CONFIG", file.path())
        .env("BFCKR_START_PAUSED", "false")
        .args(["run", "+."])
        .assert()
        .success()
        .stderr(predicate::str::contains("paused").not());
}

#[test]
fn log_level_comes_from_bfckr_log() {
    cargo_bin()
        .env("BFCKR_LOG", "debug")
        .args(["run", "+."])
        .assert()
        .success()
        .stderr(predicate::str::contains("run finished after 2 steps"));
}
