use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RECEIPT_TEXT: &str = "Sent via GCash
Amount 1,000.00
Ref No. 8031350663152
Aug 5, 2025 12:33 AM
+63 915 642 9591";

const CATALOG: &str = r#"{
  "patterns": [
    {
      "id": "p1",
      "pattern_name": "GCash Receipt",
      "account_type": "gcash",
      "amount_pattern": "Amount\\s*([0-9,]+\\.?[0-9]*)",
      "reference_pattern": "Ref No\\.\\s*([0-9]+)",
      "date_pattern": "([A-Za-z]{3}\\s+[0-9]{1,2},\\s+[0-9]{4}\\s+[0-9]{1,2}:[0-9]{2}\\s*[AP]M)",
      "phone_pattern": "(\\+63\\s*[0-9]{3}\\s*[0-9]{3}\\s*[0-9]{4}|09[0-9]{9})",
      "priority": 10
    }
  ],
  "accounts": [
    {
      "id": "a1",
      "account_type": "gcash",
      "account_name": "Main GCash",
      "account_number": "0915 642 9591",
      "account_holder_name": "Maria Santos",
      "is_primary": true
    }
  ]
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), "{}").unwrap();
        fs::write(dir.path().join("catalog.json"), CATALOG).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("slipscan").unwrap();
        cmd.current_dir(self.dir.path())
            .arg("-c")
            .arg(self.path("config.json"));
        cmd
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn process_text_matches_configured_account() {
    let ws = Workspace::new();
    let input = ws.write("receipt.txt", RECEIPT_TEXT);

    ws.cmd()
        .args(["process", arg(&input), "--catalog", "catalog.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reference_number\": \"8031350663152\""))
        .stdout(predicate::str::contains("\"is_valid_account\": true"))
        .stdout(predicate::str::contains("\"matched_account\": \"Main GCash\""))
        .stdout(predicate::str::contains("\"date_time\": \"2025-08-05T00:33\""));
}

#[test]
fn process_reports_unmatched_account() {
    let ws = Workspace::new();
    let input = ws.write("receipt.txt", &RECEIPT_TEXT.replace("915 642 9591", "917 000 1234"));

    ws.cmd()
        .args(["process", arg(&input), "--catalog", "catalog.json", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no configured account matched"))
        .stderr(predicate::str::contains("0915 642 9591"));
}

#[test]
fn process_applies_tip_to_commission() {
    let ws = Workspace::new();
    let input = ws.write("receipt.txt", RECEIPT_TEXT);

    ws.cmd()
        .args(["process", arg(&input), "--catalog", "catalog.json", "--format", "csv", "--tip", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1000.00"))
        .stdout(predicate::str::contains("230.00"));
}

#[test]
fn process_save_writes_record() {
    let ws = Workspace::new();
    let input = ws.write("receipt.txt", RECEIPT_TEXT);
    let data_dir = ws.path("data");

    ws.cmd()
        .args(["process", arg(&input), "--catalog", "catalog.json", "--save"])
        .args(["--agent", "agent-1", "--data-dir", arg(&data_dir)])
        .assert()
        .success();

    let records = fs::read_to_string(data_dir.join("receipts.jsonl")).unwrap();
    assert_eq!(records.lines().count(), 1);
    assert!(records.contains("\"agent_id\":\"agent-1\""));
    assert!(records.contains("8031350663152"));
}

#[test]
fn process_save_requires_agent() {
    let ws = Workspace::new();
    let input = ws.write("receipt.txt", RECEIPT_TEXT);

    ws.cmd()
        .args(["process", arg(&input), "--catalog", "catalog.json", "--save"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--agent is required"));
}

#[test]
fn process_missing_input_fails() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["process", "nope.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let ws = Workspace::new();
    ws.write("first.txt", RECEIPT_TEXT);
    ws.write("second.txt", "nothing useful here");
    let out = ws.path("out");
    let pattern = format!("{}/*.txt", ws.dir.path().display());

    ws.cmd()
        .args(["batch", &pattern, "--catalog", "catalog.json", "--summary"])
        .args(["--output-dir", arg(&out)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 files"));

    assert!(out.join("first.json").exists());
    assert!(out.join("second.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
    assert!(summary.lines().next().unwrap().starts_with("filename,status,amount"));
}

#[test]
fn commission_uses_default_rates() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["commission", "1000", "--tip", "100"])
        .assert()
        .success()
        .stdout(predicate::str::diff("230.00\n"));
}

#[test]
fn commission_rejects_negative_amount() {
    let ws = Workspace::new();

    ws.cmd().args(["commission", "--", "-5"]).assert().failure();
}

#[test]
fn patterns_test_reports_captures() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["patterns", "test", "--text", "Amount 150.00 Ref No. 42", "--defaults", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"value\": \"150.00\""))
        .stdout(predicate::str::contains("\"value\": \"42\""));
}

#[test]
fn patterns_list_shows_catalog() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["patterns", "list", "--catalog", "catalog.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GCash Receipt"));
}

#[test]
fn accounts_list_shows_normalized_number() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["accounts", "list", "--catalog", "catalog.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("09156429591"));
}

#[test]
fn config_init_set_and_get() {
    let ws = Workspace::new();
    let config = ws.path("settings/config.json");
    let config_arg = arg(&config);

    Command::cargo_bin("slipscan")
        .unwrap()
        .args(["-c", config_arg, "config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    Command::cargo_bin("slipscan")
        .unwrap()
        .args(["-c", config_arg, "config", "set", "commission.tip_rate", "40"])
        .assert()
        .success();

    Command::cargo_bin("slipscan")
        .unwrap()
        .args(["-c", config_arg, "config", "get", "commission.tip_rate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("40"));

    Command::cargo_bin("slipscan")
        .unwrap()
        .args(["-c", config_arg, "config", "set", "commission.nope", "1"])
        .assert()
        .failure();
}
