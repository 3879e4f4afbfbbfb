//! CLI Integration Tests
//!
//! Runs the binary with assert_cmd against fixture workbooks in a temp dir.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

mod common;

use assert_cmd::Command;
use common::{write_corrupt, FdmFixture};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("fdm-extractor").unwrap();
    cmd.env_remove("FDM_EXTRACTOR_CONFIG").env("NO_COLOR", "1");
    cmd
}

fn output_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".xlsx"))
        .collect();
    names.sort();
    names
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fdm-extractor"))
        .stdout(predicate::str::contains("EXAMPLES"));
}

#[test]
fn test_cli_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fdm-extractor"));
}

#[test]
fn test_extract_requires_inputs() {
    cmd().arg("extract").assert().failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// EXTRACT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_extract_directory() {
    let temp = TempDir::new().unwrap();
    let forms = temp.path().join("forms");
    let out = temp.path().join("out");
    fs::create_dir(&forms).unwrap();
    FdmFixture::default().write(&forms.join("a.xlsx"));
    FdmFixture::default().write(&forms.join("b.xlsm"));
    fs::write(forms.join("readme.txt"), "ignored").unwrap();

    cmd()
        .arg("extract")
        .arg(&forms)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("[1/2]"))
        .stdout(predicate::str::contains("[2/2]"))
        .stdout(predicate::str::contains("Extraction Complete"));

    let written = output_files(&out);
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("Hasil_Ekstraksi_FDM_"));
}

#[test]
fn test_extract_reports_failed_file_and_continues() {
    let temp = TempDir::new().unwrap();
    let good = FdmFixture::default().write(&temp.path().join("good.xlsx"));
    let bad = write_corrupt(&temp.path().join("bad.xlsx"));
    let report = temp.path().join("report.json");

    cmd()
        .arg("extract")
        .arg(&good)
        .arg(&bad)
        .arg("-o")
        .arg(temp.path())
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("bad.xlsx"))
        .stdout(predicate::str::contains("Failed: 1"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["completed"], 1);
    assert_eq!(json["failed"], 1);
    // good.xlsx, bad.xlsx and the output workbook
    assert_eq!(output_files(temp.path()).len(), 3);
}

#[test]
fn test_extract_twice_into_the_input_directory() {
    let temp = TempDir::new().unwrap();
    FdmFixture::default().write(&temp.path().join("a.xlsx"));

    cmd()
        .arg("extract")
        .arg(temp.path())
        .arg("-o")
        .arg(temp.path())
        .assert()
        .success();
    // distinct timestamp for the second output
    std::thread::sleep(std::time::Duration::from_millis(1100));

    cmd()
        .arg("extract")
        .arg(temp.path())
        .arg("-o")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Files:  1"))
        .stdout(predicate::str::contains("[1/1]"))
        .stdout(predicate::str::contains("1 rows"));

    let outputs: Vec<_> = output_files(temp.path())
        .into_iter()
        .filter(|n| n.starts_with("Hasil_Ekstraksi_FDM_"))
        .collect();
    assert_eq!(outputs.len(), 2);
}

#[test]
fn test_unwritable_report_does_not_block_output() {
    let temp = TempDir::new().unwrap();
    let form = FdmFixture::default().write(&temp.path().join("a.xlsx"));
    let out = temp.path().join("out");
    let report = temp.path().join("missing").join("report.json");

    cmd()
        .arg("extract")
        .arg(&form)
        .arg("-o")
        .arg(&out)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report not written"))
        .stdout(predicate::str::contains("Extraction Complete"));

    assert!(!report.exists());
    assert_eq!(output_files(&out).len(), 1);
}

#[test]
fn test_extract_fails_when_nothing_extracted() {
    let temp = TempDir::new().unwrap();
    let bad = write_corrupt(&temp.path().join("bad.xlsx"));
    let out = temp.path().join("out");

    cmd()
        .arg("extract")
        .arg(&bad)
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no file could be extracted"));

    assert!(!out.exists());
}

#[test]
fn test_extract_with_config_prefix() {
    let temp = TempDir::new().unwrap();
    let form = FdmFixture::default().write(&temp.path().join("a.xlsx"));
    let config = temp.path().join("fdm.yaml");
    fs::write(&config, "output:\n  file_prefix: Rekap\n").unwrap();
    let out = temp.path().join("out");

    cmd()
        .arg("extract")
        .arg(&form)
        .arg("-o")
        .arg(&out)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let written = output_files(&out);
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("Rekap_"), "{}", written[0]);
}

#[test]
fn test_extract_with_invalid_config() {
    let temp = TempDir::new().unwrap();
    let form = FdmFixture::default().write(&temp.path().join("a.xlsx"));
    let config = temp.path().join("fdm.yaml");
    fs::write(&config, "scenario:\n  uplift: 3\n").unwrap();

    cmd()
        .arg("extract")
        .arg(&form)
        .env("FDM_EXTRACTOR_CONFIG", &config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

// ═══════════════════════════════════════════════════════════════════════════
// CATALOG AND INIT-CONFIG
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_catalog_lists_fields() {
    cmd()
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sheet Home!H5"))
        .stdout(predicate::str::contains("DATA BUMI"))
        .stdout(predicate::str::contains("SIMULASI SPPT 2026"));
}

#[test]
fn test_init_config_writes_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("fdm.yaml");

    cmd().arg("init-config").arg(&path).assert().success();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("file_prefix: Hasil_Ekstraksi_FDM"));
    assert!(content.contains("uplift: 0.103"));

    cmd().arg("init-config").arg(&path).assert().failure();
    cmd()
        .arg("init-config")
        .arg(&path)
        .arg("--force")
        .assert()
        .success();
}
