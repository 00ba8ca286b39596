//! End-to-end tests for the `tally` binary
//!
//! Every command runs inside a temporary directory with HOME pointed at it,
//! so neither a real `~/.tally/config.toml` nor a stray `tally.toml` leaks in.

use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

fn tally(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("tally");
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("TALLY_DEBUG")
        .env_remove("TALLY_JSON")
        .env_remove("TALLY_NO_DEFAULT_MESSAGE")
        .env_remove("RUST_LOG");
    cmd
}

fn json_output(cmd: &mut assert_cmd::Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// tally suites / tally list
// ============================================================================

#[test]
fn test_suites_lists_builtins() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .arg("suites")
        .assert()
        .success()
        .stdout(predicate::str::contains("selfcheck"))
        .stdout(predicate::str::contains("demo"));
}

#[test]
fn test_list_prints_labels_in_order() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .args(["list", "demo"])
        .assert()
        .success()
        .stdout(
            "addition\ngreeting\nlookup table\nfixture file\npi estimate\ninventory\n<anonymous>\n",
        );
}

#[test]
fn test_list_with_filter() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .args(["list", "demo", "--filter", "pi"])
        .assert()
        .success()
        .stdout("pi estimate\n");
}

#[rstest]
#[case::run(&["run", "nope"])]
#[case::list(&["list", "nope"])]
fn test_unknown_suite(#[case] args: &[&str]) {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown suite 'nope'"))
        .stderr(predicate::str::contains("selfcheck, demo"));
}

// ============================================================================
// tally run - console output
// ============================================================================

#[test]
fn test_selfcheck_passes() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .args(["run", "selfcheck", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test result: PASSED"))
        .stdout(predicate::str::contains(
            "11 total, 11 passed, 0 failed, 0 errors",
        ))
        .stdout(predicate::str::contains("Failures:").not());
}

#[test]
fn test_demo_reports_failures_and_errors() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .args(["run", "demo", "--no-color"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Test result: FAILED"))
        .stdout(predicate::str::contains(
            "7 total, 2 passed, 3 failed, 2 errors",
        ))
        .stdout(predicate::str::contains("Failures:"))
        .stdout(predicate::str::contains("lookup table not loaded"))
        .stdout(predicate::str::contains("[RoughlyEqual#EST2]"))
        .stderr(predicate::str::contains("could not be registered"));
}

#[test]
fn test_verbose_prints_one_line_per_test() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .args(["run", "demo", "--verbose", "--no-color"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("PASS addition"))
        .stdout(predicate::str::contains("FAIL greeting"))
        .stdout(predicate::str::contains("ERROR lookup table"))
        .stdout(predicate::str::contains("PASS <anonymous>"));
}

#[test]
fn test_filter_limits_run() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .args(["run", "demo", "--filter", "addition", "--no-color"])
        .assert()
        .code(1) // the non-callable registration still counts
        .stdout(predicate::str::contains("1 total, 1 passed"))
        .stdout(predicate::str::contains("6 filtered out"));

    tally(&dir)
        .args(["run", "selfcheck", "--filter", "equality", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 total, 3 passed"));
}

#[test]
fn test_filter_matching_nothing() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .args(["run", "selfcheck", "--filter", "zzz", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tests found."))
        .stdout(predicate::str::contains(
            "0 total, 0 passed, 0 failed, 0 errors",
        ));
}

#[test]
fn test_filter_matching_nothing_still_reports_rejected_registration() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .args(["run", "demo", "--filter", "zzz", "--no-color"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No tests found."))
        .stdout(predicate::str::contains("Test result: PASSED | 0 total"))
        .stderr(predicate::str::contains("could not be registered"));

    let mut cmd = tally(&dir);
    cmd.args(["run", "demo", "--filter", "zzz", "--json"]);
    let doc = json_output(&mut cmd);
    assert_eq!(doc["tests"], 0);
    assert_eq!(doc["assertions"], 0);
    assert_eq!(doc["registration_errors"], 1);
    assert_eq!(doc["results"].as_array().map(Vec::len), Some(0));
    cmd.assert().code(1);
}

// ============================================================================
// tally run - JSON output
// ============================================================================

#[test]
fn test_json_document() {
    let dir = TempDir::new().unwrap();
    let doc = json_output(tally(&dir).args(["run", "demo", "--json"]));

    assert_eq!(doc["suite"], "demo");
    assert_eq!(doc["tests"], 7);
    assert_eq!(doc["passed"], 2);
    assert_eq!(doc["failed"], 3);
    assert_eq!(doc["errors"], 2);
    assert_eq!(doc["registration_errors"], 1);
    assert_eq!(doc["success"], false);

    let results = doc["results"].as_array().unwrap();
    let statuses: Vec<_> = results.iter().map(|r| r["status"].as_str().unwrap()).collect();
    assert_eq!(
        statuses,
        vec!["pass", "fail", "error", "error", "fail", "fail", "pass"]
    );
    assert_eq!(
        results[1]["detail"],
        "[StrContains] Expected \"hello world\" to contain \"goodbye\": greeting text"
    );
    assert!(results[3]["detail"].as_str().unwrap().contains("No such file"));
}

#[test]
fn test_json_from_environment() {
    let dir = TempDir::new().unwrap();
    let doc = json_output(
        tally(&dir)
            .env("TALLY_JSON", "1")
            .args(["run", "selfcheck"]),
    );
    assert_eq!(doc["success"], true);
    assert_eq!(doc["tests"], 11);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_project_config_is_discovered() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("tally.toml"),
        r#"
[runner]
show_default_message = false

[report]
json = true
"#,
    )
    .unwrap();

    let doc = json_output(tally(&dir).args(["run", "demo", "--filter", "greeting"]));
    assert_eq!(doc["results"][0]["detail"], "[StrContains] greeting text");
}

#[test]
fn test_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ci.toml");
    fs::write(&path, "[report]\nconsole = false\n").unwrap();

    tally(&dir)
        .args(["run", "selfcheck", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[runner]\ntimeout = 3\n").unwrap();

    tally(&dir)
        .args(["run", "selfcheck", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn test_invalid_env_flag_is_reported() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .env("TALLY_DEBUG", "sometimes")
        .args(["run", "selfcheck"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TALLY_DEBUG"));
}
