//! End-to-end runs of the `electsim` binary.

use std::fs;
use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn district_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("districts.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "State,Number,Member,Party,2025 Cook PVI").unwrap();
    writeln!(f, "Iowa,1,Mariannette Miller-Meeks,R,R+6").unwrap();
    writeln!(f, "Iowa,3,Zach Nunn,R,R+3").unwrap();
    writeln!(f, "Virginia,7,Eugene Vindman,D,D+1").unwrap();
    writeln!(f, "Virginia,9,Morgan Griffith,R,R+?").unwrap();
    path
}

fn electsim() -> Command {
    Command::cargo_bin("electsim").unwrap()
}

#[test]
fn full_run_writes_report_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let data = district_file(&dir);
    let out = dir.path().join("results.json");

    electsim()
        .args(["--data-file", data.to_str().unwrap(), "--output", out.to_str().unwrap()])
        .args(["--election-type", "primary,irv,condorcet", "--nvoters", "200", "--seed", "0x2a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Congressional Simulation Results ==="))
        .stdout(predicate::str::contains("--- condorcet ---"));

    let v: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(v["seed"], 42);
    assert_eq!(v["rejected_rows"].as_array().unwrap().len(), 1);
    assert_eq!(v["runs"].as_array().unwrap().len(), 3);
    assert_eq!(v["runs"][0]["districts"].as_array().unwrap().len(), 3);
    assert_eq!(v["report_digest"].as_str().map(str::len), Some(64));
}

#[test]
fn reruns_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let data = district_file(&dir);
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");

    for (out, threads) in [(&a, "1"), (&b, "3")] {
        electsim()
            .args(["--data-file", data.to_str().unwrap(), "--output", out.to_str().unwrap()])
            .args(["--election-type", "top-2", "--nvoters", "150", "--threads", threads, "--canonical", "--quiet"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
}

#[test]
fn config_file_is_layered_under_flags() {
    let dir = tempfile::tempdir().unwrap();
    let data = district_file(&dir);
    let cfg = dir.path().join("config.json");
    fs::write(&cfg, r#"{"seed": 5, "n_voters": 120, "methods": ["irv"]}"#).unwrap();
    let out = dir.path().join("out.json");

    electsim()
        .args(["--data-file", data.to_str().unwrap(), "--config", cfg.to_str().unwrap()])
        .args(["--output", out.to_str().unwrap(), "--seed", "9", "--district", "IA-03", "--trace", "-q"])
        .assert()
        .success();

    let v: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(v["seed"], 9);
    assert_eq!(v["config"]["n_voters"], 120);
    assert_eq!(v["runs"][0]["method"], "irv");
    let districts = v["runs"][0]["districts"].as_array().unwrap();
    assert_eq!(districts.len(), 1);
    assert_eq!(districts[0]["district"], "IA-03");
    assert_eq!(districts[0]["trace"]["tabulation"]["kind"], "instant_runoff");
}

#[test]
fn validate_only_reports_rejections_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let data = district_file(&dir);
    let out = dir.path().join("never.json");

    electsim()
        .env_remove("RUST_LOG")
        .args(["--data-file", data.to_str().unwrap(), "--output", out.to_str().unwrap(), "--validate-only"])
        .assert()
        .success()
        .stderr(predicate::str::contains("validate-only").and(predicate::str::contains("rejected=1")));
    assert!(!out.exists());
}

#[test]
fn exit_codes_follow_the_error_class() {
    let dir = tempfile::tempdir().unwrap();
    let data = district_file(&dir);

    // invalid configuration value
    electsim()
        .args(["--data-file", data.to_str().unwrap(), "--nvoters", "0", "--validate-only"])
        .assert()
        .code(2);

    // unknown election type is rejected by the parser
    electsim()
        .args(["--data-file", data.to_str().unwrap(), "--election-type", "borda"])
        .assert()
        .code(2);

    // unknown district filter
    electsim()
        .args(["--data-file", data.to_str().unwrap(), "--district", "IA-09", "--validate-only"])
        .assert()
        .code(2);

    // missing input file
    electsim()
        .args(["--data-file", dir.path().join("missing.csv").to_str().unwrap()])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("file not found"));

    // remote paths are refused
    electsim()
        .args(["--data-file", "https://example.org/districts.csv"])
        .assert()
        .code(2);
}
