//! CLI integration tests
//!
//! These run the built `logbridge` binary and check what it prints.

use std::process::Command;

fn run(args: &[&str]) -> (bool, String, String) {
    let cli_bin = env!("CARGO_BIN_EXE_logbridge");
    let output = Command::new(cli_bin)
        .args(args)
        .output()
        .expect("Failed to execute CLI");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn test_cli_relay_text_output() {
    let (ok, stdout, stderr) = run(&[
        "relay",
        "--count",
        "3",
        "--level",
        "warn",
        "--no-location",
    ]);
    assert!(ok, "relay failed: {}", stderr);

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        &lines[..3],
        &[
            "[warn] logbridge::commands::relay: record 1 of 3",
            "[warn] logbridge::commands::relay: record 2 of 3",
            "[warn] logbridge::commands::relay: record 3 of 3",
        ]
    );
    assert_eq!(
        lines[3],
        "relayed 3 record(s): 3 delivered, 0 failed; adapter disabled"
    );
}

#[test]
fn test_cli_relay_json_output_with_failures() {
    let (ok, stdout, stderr) = run(&[
        "relay",
        "--count",
        "4",
        "--fail-every",
        "2",
        "--format",
        "json",
    ]);
    assert!(ok, "relay failed: {}", stderr);

    let records: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["level"], "info");
    assert!(records[0]["message"]
        .as_str()
        .unwrap()
        .ends_with("record 1 of 4"));
    assert!(stdout.contains("4 record(s): 2 delivered, 2 failed"));
    assert!(stderr.contains("rejected by --fail-every"));
}

#[test]
fn test_cli_relay_respects_max_level() {
    let (ok, stdout, _) = run(&[
        "relay",
        "--count",
        "2",
        "--level",
        "debug",
        "--max-level",
        "info",
    ]);
    assert!(ok);
    assert!(stdout.contains("relayed 0 record(s)"));
}

#[test]
fn test_cli_lifecycle_walk() {
    let (ok, stdout, stderr) = run(&["lifecycle"]);
    assert!(ok, "lifecycle failed: {}", stderr);

    assert!(stdout.contains("start: phase=never enabled is_enabled=false can_enable=true"));
    assert!(stdout.contains("enable: phase=enabled is_enabled=true can_enable=false"));
    assert!(stdout.contains("handler <- [info] first record"));
    assert!(stdout
        .contains("second enable refused: Log adapter cannot be enabled: already enabled"));
    assert!(stdout.contains("disable: phase=disabled is_enabled=false can_enable=false"));
    assert!(stdout.contains("emit after disable delivered: false"));
    assert!(stdout
        .contains("re-enable refused: Log adapter cannot be enabled: already disabled"));
}

#[test]
fn test_cli_rejects_unknown_profile() {
    let (ok, _, stderr) = run(&["--profile", "loud", "lifecycle"]);
    assert!(!ok);
    assert!(stderr.contains("unknown logging profile"));
}
