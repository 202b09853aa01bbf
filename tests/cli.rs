use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE_QIF: &str = include_str!("fixtures/sample.qif");
const RULES: &str = include_str!("fixtures/pico-accountancy.json");

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("statement.qif"), SAMPLE_QIF).unwrap();
        fs::write(dir.path().join("rules.json"), RULES).unwrap();
        Workspace { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self, sub: &str, source: &Path, dest: &Path) -> Command {
        let mut cmd = Command::cargo_bin("pico-accountancy").unwrap();
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .arg(sub)
            .arg(source)
            .arg(dest)
            .arg("-r")
            .arg(self.path("rules.json"));
        cmd
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap()
    }
}

#[test]
fn bank_writes_identified_rows() {
    let ws = Workspace::new();
    ws.cmd("bank", &ws.path("statement.qif"), &ws.path("out/bank.csv"))
        .args(["-c", "Rent,Legal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Done. Version"));

    let csv = ws.read("out/bank.csv");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        r#""Date","Description","Credit","Debit","Id","Type","Category","Rent","Legal""#
    );
    assert_eq!(lines.len(), 8);
    assert!(lines[1].contains(r#""'15-CAP-02""#));
    assert!(lines[7].contains(r#""'15-INTEREST-03""#));
    assert!(csv.ends_with('\n'));
}

#[test]
fn total_prints_table_and_writes_summary() {
    let ws = Workspace::new();
    ws.cmd("total", &ws.path("statement.qif"), &ws.path("total.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Total debit"))
        .stdout(predicate::str::contains("407.56"));

    let text = ws.read("total.txt");
    assert!(text.starts_with("Summary:\ncredit: 250.02\ndebit: 407.56\n"));
    assert!(text.ends_with("\nInvoices: 0\n"));
    assert!(!text.ends_with("\n\n"));
    assert!(!text.contains("-0"));
}

#[test]
fn todo_reports_nothing_when_every_row_matches() {
    let ws = Workspace::new();
    ws.cmd("todo", &ws.path("statement.qif"), &ws.path("todo.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Every transaction matches a rule."));

    assert_eq!(
        ws.read("todo.csv"),
        "\"Id\",\"Date\",\"Description\",\"Credit\",\"Debit\"\n"
    );
}

#[test]
fn debit_and_credit_summaries_are_written() {
    let ws = Workspace::new();
    ws.cmd("debit", &ws.path("statement.qif"), &ws.path("debit.csv"))
        .assert()
        .success();
    ws.cmd("credit", &ws.path("statement.qif"), &ws.path("credit.csv"))
        .assert()
        .success();

    assert!(ws.read("debit.csv").starts_with("\"Rent\",\"250\"\n"));
    assert!(ws.read("credit.csv").contains("\"Interest\",\"0.02\""));
}

#[test]
fn missing_rules_file_fails() {
    let ws = Workspace::new();
    Command::cargo_bin("pico-accountancy")
        .unwrap()
        .current_dir(ws.dir.path())
        .env("HOME", ws.dir.path())
        .args(["bank", "statement.qif", "bank.csv", "-r", "nowhere.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configuration file cannot be found"));
    assert!(!ws.path("bank.csv").exists());
}

#[test]
fn missing_source_fails() {
    let ws = Workspace::new();
    ws.cmd("bank", &ws.path("missing.qif"), &ws.path("bank.csv"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Loading the QIF file"));
}

#[test]
fn corrupted_record_aborts_unless_skipped() {
    let ws = Workspace::new();
    let broken = "!Type:Bank\nD01/04/2015\nPNO AMOUNT HERE\n^\n".to_string() + SAMPLE_QIF;
    fs::write(ws.path("broken.qif"), broken).unwrap();

    ws.cmd("bank", &ws.path("broken.qif"), &ws.path("bank.csv"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Corrupted data"));
    assert!(!ws.path("bank.csv").exists());

    ws.cmd("bank", &ws.path("broken.qif"), &ws.path("bank.csv"))
        .arg("--skip-corrupted")
        .assert()
        .success();
    assert_eq!(ws.read("bank.csv").lines().count(), 8);
}

#[test]
fn check_reports_corruption_without_failing() {
    let ws = Workspace::new();
    fs::write(ws.path("broken.qif"), "D01/04/2015\nPNO AMOUNT HERE\n^\n").unwrap();

    ws.cmd("check", &ws.path("broken.qif"), &ws.path("check.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("looks corrupted"));

    let report = ws.read("check.csv");
    assert!(report.contains(r#""Corrupted records","1""#));
}
