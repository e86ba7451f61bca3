//! CLI integration tests using `assert_cmd`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CONFIG: &str = r#"
name = "vat_rates"

[[structure.key]]
name = "country"
type = "String"

[[structure.key]]
name = "category"
type = "UInt32"

[[structure.attribute]]
name = "rate"
type = "Float64"
null_value = "0"

[[structure.attribute]]
name = "label"
type = "String"
null_value = "unknown"
"#;

const DATA: &str = "country,category,rate,label\n\
FR,1,0.2,standard\n\
FR,2,0.055,reduced\n\
DE,1,0.19,standard\n\
\"St Barth, FR\",1,0,exempt\n";

#[allow(deprecated)]
fn hashdict_cmd() -> Command {
    Command::cargo_bin("hashdict").unwrap()
}

struct Fixture {
    _dir: TempDir,
    config: PathBuf,
    data: PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("vat.toml");
    let data = dir.path().join("vat.csv");
    fs::write(&config, CONFIG).unwrap();
    fs::write(&data, DATA).unwrap();
    Fixture {
        _dir: dir,
        config,
        data,
    }
}

fn cmd_with(fixture: &Fixture) -> Command {
    let mut cmd = hashdict_cmd();
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(&fixture.config)
        .arg("--data")
        .arg(&fixture.data);
    cmd
}

#[test]
fn test_help_displays_usage() {
    hashdict_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("composite-key dictionary lookups"))
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_displays_version() {
    hashdict_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hashdict"));
}

#[test]
fn test_get_json() {
    let fixture = fixture();
    cmd_with(&fixture)
        .args(["get", "rate", "--key", "FR,2", "--key", "IT,1", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"key":"FR,2","rate":0.055}"#))
        .stdout(predicate::str::contains(r#"{"key":"IT,1","rate":0.0}"#));
}

#[test]
fn test_get_with_default_and_quoted_key() {
    let fixture = fixture();
    cmd_with(&fixture)
        .args([
            "get",
            "label",
            "--key",
            "\"St Barth, FR\",1",
            "--key",
            "ES,1",
            "--default",
            "n/a",
            "--format",
            "csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"\"St Barth, FR\"\",1\",exempt"))
        .stdout(predicate::str::contains("\"ES,1\",n/a"));
}

#[test]
fn test_has_prints_flags() {
    let fixture = fixture();
    cmd_with(&fixture)
        .args(["has", "--key", "DE,1", "--key", "DE,2", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("key,present"))
        .stdout(predicate::str::contains("\"DE,1\",1"))
        .stdout(predicate::str::contains("\"DE,2\",0"));
}

#[test]
fn test_dump_with_limit() {
    let fixture = fixture();
    let output = cmd_with(&fixture)
        .args(["dump", "--limit", "2", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 2);
    for line in stdout.lines() {
        let row: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(row.get("country").is_some());
        assert!(row.get("label").is_some());
    }
}

#[test]
fn test_stats_json() {
    let fixture = fixture();
    let output = cmd_with(&fixture).args(["stats", "--format", "json"]).output().unwrap();

    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["name"], "vat_rates");
    assert_eq!(stats["element_count"], 4);
    assert_eq!(stats["query_count"], 0);
}

#[test]
fn test_unknown_attribute_fails() {
    let fixture = fixture();
    cmd_with(&fixture)
        .args(["get", "vat", "--key", "FR,1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HDICT-"));
}

#[test]
fn test_bad_key_tuple_fails() {
    let fixture = fixture();
    cmd_with(&fixture)
        .args(["has", "--key", "FR"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has 1 fields"));
}

#[test]
fn test_missing_config_fails() {
    let fixture = fixture();
    hashdict_cmd()
        .arg("--config")
        .arg(fixture.data.with_extension("missing"))
        .arg("--data")
        .arg(&fixture.data)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
