//! End-to-end tests for the `pm` binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Config that never needs the network: no feeds, no calendars, no weather
/// key, and a horoscope endpoint that refuses connections
const OFFLINE_CONFIG: &str = r#"
general:
  dry-run: true
http:
  timeout-ms: 2000
weather:
  api-key: ""
  api-key-env: PRINTMASTER_TEST_UNSET_KEY
horoscope:
  base-url: "http://127.0.0.1:1/"
calendars: []
news:
  sources: []
jokes:
  - "Why was the printer calm?\nIt had nothing left to jam about."
"#;

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("printmaster.yml");
    fs::write(&path, OFFLINE_CONFIG).expect("Failed to write config");
    path
}

fn pm() -> Command {
    let mut cmd = Command::cargo_bin("pm").expect("Failed to find pm binary");
    cmd.env_remove("PRINTMASTER_TEST_UNSET_KEY");
    cmd
}

#[test]
fn test_dry_run_prints_briefing() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    pm().arg("--config")
        .arg(&config)
        .args(["print", "--dry-run", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN - PRINT SIMULATION"))
        .stdout(predicate::str::contains("DAILY BRIEFING"))
        .stdout(predicate::str::contains("Could not load the weather"))
        .stdout(predicate::str::contains("Why was the printer calm?"))
        .stdout(predicate::str::contains("END OF PRINT"))
        .stdout(predicate::str::contains("NEWS").not());
}

#[test]
fn test_default_command_is_print() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    pm().arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("DAILY BRIEFING"));
}

#[test]
fn test_same_seed_same_output() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let run = || {
        pm().arg("--config")
            .arg(&config)
            .args(["print", "--seed", "42"])
            .output()
            .expect("Failed to run pm")
            .stdout
    };

    assert_eq!(run(), run());
}

#[test]
fn test_logs_go_to_stderr() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    pm().arg("--config")
        .arg(&config)
        .args(["--log-level", "debug", "print"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Horoscope unavailable"))
        .stdout(predicate::str::contains("Horoscope unavailable").not());
}

#[test]
fn test_missing_printer_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    pm().arg("--config")
        .arg(&config)
        .args(["print", "--device", "/nonexistent/printmaster/lp0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open output device"));
}

#[test]
fn test_invalid_config_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("printmaster.yml");
    fs::write(&path, "almanac:\n  holidays:\n    \"24-12\": Backwards\n").unwrap();

    pm().arg("--config")
        .arg(&path)
        .args(["print", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_init_writes_default_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("conf").join("printmaster.yml");

    pm().arg("--config").arg(&path).arg("init").assert().success();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("paper-width: 32"));
    assert!(content.contains("device-path: /dev/usb/lp0"));
    assert!(content.contains("zodiac-sign: aries"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    let path = write_config(temp.path());

    pm().arg("--config")
        .arg(&path)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), OFFLINE_CONFIG);

    pm().arg("--config").arg(&path).args(["init", "--force"]).assert().success();
    assert_ne!(fs::read_to_string(&path).unwrap(), OFFLINE_CONFIG);
}
