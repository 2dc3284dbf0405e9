use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn produce(home: &Path, channel: &Path, count: &str, extra: &[&str]) {
    cargo_bin_cmd!("reviewstream")
        .env("REVIEWSTREAM_HOME", home)
        .env_remove("REVIEWSTREAM_CHANNEL")
        .args(["produce", "--output"])
        .arg(channel)
        .args(["--count", count, "--interval-ms", "0", "--seed", "7"])
        .args(extra)
        .assert()
        .success()
        .stderr(predicate::str::contains(format!("Published {count} review(s)")));
}

#[test]
fn test_produce_writes_ndjson_file() {
    let dir = tempdir().unwrap();
    let channel = dir.path().join("live").join("reviews.jsonl");

    produce(dir.path(), &channel, "5", &[]);

    let contents = fs::read_to_string(&channel).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 5);
    for line in lines {
        let message: Value = serde_json::from_str(line).unwrap();
        assert!(message["category"].is_string());
        let score = message["Review Score"].as_u64().unwrap();
        assert!((50..=99).contains(&score), "{line}");
    }
}

#[test]
fn test_produce_truncates_unless_append() {
    let dir = tempdir().unwrap();
    let channel = dir.path().join("reviews.jsonl");

    produce(dir.path(), &channel, "3", &[]);
    produce(dir.path(), &channel, "3", &[]);
    assert_eq!(fs::read_to_string(&channel).unwrap().lines().count(), 3);

    produce(dir.path(), &channel, "3", &["--append"]);
    assert_eq!(fs::read_to_string(&channel).unwrap().lines().count(), 6);
}

#[test]
fn test_produce_to_stdout() {
    let dir = tempdir().unwrap();

    let output = cargo_bin_cmd!("reviewstream")
        .env("REVIEWSTREAM_HOME", dir.path())
        .args(["produce", "--output", "-", "--count", "3", "--interval-ms", "0"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 3);
    for line in stdout.lines() {
        serde_json::from_str::<Value>(line).unwrap();
    }
}

#[test]
fn test_consume_file_without_follow_prints_summary() {
    let dir = tempdir().unwrap();
    let channel = dir.path().join("reviews.jsonl");
    produce(dir.path(), &channel, "6", &[]);

    cargo_bin_cmd!("reviewstream")
        .env("REVIEWSTREAM_HOME", dir.path())
        .args(["consume", "--no-follow", "--plain", "--input"])
        .arg(&channel)
        .assert()
        .success()
        .stdout(predicate::str::contains("| Genre"))
        .stdout(predicate::str::contains("Consumed 6 message(s)"))
        .stdout(predicate::str::contains("dropped 0 malformed"));
}

#[test]
fn test_consume_stdin_drops_malformed_lines() {
    let dir = tempdir().unwrap();
    let input = concat!(
        "{\"category\":\"RPG\",\"Review Score\":80}\n",
        "{\"category\": \"RPG\"}\n",
        "not json at all\n",
        "{\"category\":\"RPG\",\"Review Score\":90}\n",
        "{\"category\":\"Shooter\",\"Review Score\":50}\n",
    );

    cargo_bin_cmd!("reviewstream")
        .env("REVIEWSTREAM_HOME", dir.path())
        .args(["consume", "--input", "-", "--plain"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("85.0"))
        .stdout(predicate::str::contains(
            "Consumed 3 message(s) across 2 genre(s), dropped 2 malformed.",
        ));
}

#[test]
fn test_consume_uses_channel_from_config() {
    let dir = tempdir().unwrap();
    let channel = dir.path().join("configured.jsonl");
    fs::write(
        dir.path().join("config.toml"),
        format!(
            "[channel]\npath = \"{}\"\nfollow = false\n",
            channel.display()
        ),
    )
    .unwrap();
    fs::write(&channel, "{\"category\":\"MMO\",\"Review Score\":64}\n").unwrap();

    cargo_bin_cmd!("reviewstream")
        .env("REVIEWSTREAM_HOME", dir.path())
        .env_remove("REVIEWSTREAM_CHANNEL")
        .args(["consume", "--plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MMO"))
        .stdout(predicate::str::contains("Consumed 1 message(s)"));
}

#[test]
fn test_missing_input_channel_exits_11() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nowhere").join("reviews.jsonl");

    cargo_bin_cmd!("reviewstream")
        .env("REVIEWSTREAM_HOME", dir.path())
        .args(["consume", "--no-follow", "--plain", "--input"])
        .arg(&missing)
        .assert()
        .code(11)
        .stderr(predicate::str::contains("unavailable"));
}

#[test]
fn test_unwritable_output_channel_exits_11() {
    let dir = tempdir().unwrap();
    // A regular file cannot be a parent directory.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    cargo_bin_cmd!("reviewstream")
        .env("REVIEWSTREAM_HOME", dir.path())
        .args(["produce", "--count", "1", "--output"])
        .arg(blocker.join("reviews.jsonl"))
        .assert()
        .code(11);
}

#[test]
fn test_demo_runs_in_process() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("reviewstream")
        .env("REVIEWSTREAM_HOME", dir.path())
        .args([
            "demo",
            "--count",
            "4",
            "--interval-ms",
            "0",
            "--seed",
            "7",
            "--plain",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("| Genre"))
        .stdout(predicate::str::contains("Consumed 4 message(s)"));
}
