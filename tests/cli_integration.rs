//! CLI integration tests for hostcompat.
//!
//! Each test runs the binary in a fresh directory with its own HOME so no
//! user config leaks in. Host state is carried between invocations through
//! a `--state` file.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the hostcompat binary command, isolated to `dir`.
fn hostcompat(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hostcompat").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("HOSTCOMPAT_HOST_VERSION");
    cmd
}

fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

// ============================================================================
// hostcompat shims
// ============================================================================

#[test]
fn test_shims_list_in_match_order() {
    let tmp = temp_dir();

    hostcompat(tmp.path())
        .args(["shims", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v1_21_1"))
        .stdout(predicate::str::contains(">=1.21.0, <1.21.4"))
        .stdout(predicate::str::contains("v1_21_4"))
        .stdout(predicate::str::contains(">=1.21.4, <1.22.0"));
}

#[test]
fn test_shims_match_paper_version_string() {
    let tmp = temp_dir();

    hostcompat(tmp.path())
        .args(["shims", "match", "1.21.4-R0.1-SNAPSHOT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.21.4 -> v1_21_4"));

    hostcompat(tmp.path())
        .args(["shims", "match", "git-Paper-123 (MC: 1.21.1)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.21.1 -> v1_21_1"));
}

#[test]
fn test_shims_match_unsupported_version() {
    let tmp = temp_dir();

    hostcompat(tmp.path())
        .args(["shims", "match", "1.20.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no shim supports host version 1.20.0"))
        .stderr(predicate::str::contains("help: consider:"));
}

// ============================================================================
// hostcompat resolve
// ============================================================================

#[test]
fn test_resolve_reports_ready_state() {
    let tmp = temp_dir();

    hostcompat(tmp.path())
        .args(["resolve", "--host-version", "1.21.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ready: v1_21_1"))
        .stdout(predicate::str::contains("Model data:   integer"))
        .stdout(predicate::str::contains("Text shadow:  no"));

    hostcompat(tmp.path())
        .args(["resolve", "--host-version", "1.21.4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ready: v1_21_4"))
        .stdout(predicate::str::contains("Text shadow:  yes"));
}

#[test]
fn test_resolve_unsupported_host_fails() {
    let tmp = temp_dir();

    hostcompat(tmp.path())
        .args(["resolve", "--host-version", "1.20.0"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("failed:"))
        .stderr(predicate::str::contains("error: no shim supports host version"));
}

#[test]
fn test_resolve_honors_disabled_shims_in_config() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("hostcompat.toml"),
        r#"
[host]
version = "1.21.4"

[dispatch]
disabled = ["v1_21_4"]
"#,
    )
    .unwrap();

    hostcompat(tmp.path())
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("registered shims: v1_21_1"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let tmp = temp_dir();

    hostcompat(tmp.path())
        .args(["resolve", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

// ============================================================================
// hostcompat data / model / text
// ============================================================================

#[test]
fn test_data_persists_across_invocations_and_upgrades() {
    let tmp = temp_dir();
    let state = tmp.path().join("state.json");
    let state = state.to_str().unwrap();

    hostcompat(tmp.path())
        .args(["--state", state, "--host-version", "1.21.1"])
        .args(["data", "set", "item:gem", "demo:owner", "string:alex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set demo:owner on item:gem = string:alex"));

    assert!(Path::new(state).exists());

    hostcompat(tmp.path())
        .args(["--state", state, "--host-version", "1.21.4"])
        .args(["data", "get", "item:gem", "demo:owner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("string:alex"))
        .stderr(predicate::str::contains(
            "note: host state was saved by 1.21.1, now running 1.21.4",
        ));

    hostcompat(tmp.path())
        .args(["--state", state])
        .args(["data", "list", "item:gem"])
        .assert()
        .success()
        .stdout(predicate::str::contains("demo:owner = string:alex"));

    hostcompat(tmp.path())
        .args(["--state", state])
        .args(["data", "remove", "item:gem", "demo:owner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed demo:owner"));

    hostcompat(tmp.path())
        .args(["--state", state])
        .args(["data", "get", "item:gem", "demo:owner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn test_data_non_finite_float_keeps_state_loadable() {
    let tmp = temp_dir();
    let state = tmp.path().join("state.json");
    let state = state.to_str().unwrap();

    hostcompat(tmp.path())
        .args(["--state", state])
        .args(["data", "set", "item:x", "demo:k", "float:NaN"])
        .assert()
        .success();

    hostcompat(tmp.path())
        .args(["--state", state])
        .args(["data", "set", "item:x", "demo:big", "double:inf"])
        .assert()
        .success();

    hostcompat(tmp.path())
        .args(["--state", state])
        .args(["data", "list", "item:x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("demo:k = float:NaN"))
        .stdout(predicate::str::contains("demo:big = double:inf"));
}

#[test]
fn test_data_rejects_malformed_arguments() {
    let tmp = temp_dir();

    hostcompat(tmp.path())
        .args(["data", "get", "block:stone", "demo:owner"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("item:<id>"));

    hostcompat(tmp.path())
        .args(["data", "set", "item:gem", "owner", "string:x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("namespace:key"));
}

#[test]
fn test_model_index_round_trip() {
    let tmp = temp_dir();
    let state = tmp.path().join("state.json");
    let state = state.to_str().unwrap();

    for version in ["1.21.1", "1.21.4"] {
        hostcompat(tmp.path())
            .args(["--state", state, "--host-version", version])
            .args(["model", "set", "item:wand", "-7"])
            .assert()
            .success();

        hostcompat(tmp.path())
            .args(["--state", state, "--host-version", version])
            .args(["model", "get", "item:wand"])
            .assert()
            .success()
            .stdout(predicate::str::contains("-7"));
    }
}

#[test]
fn test_model_on_entity_fails() {
    let tmp = temp_dir();

    hostcompat(tmp.path())
        .args(["model", "set", "entity:cow", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only applies to items"));
}

#[test]
fn test_text_render_shadow_depends_on_host() {
    let tmp = temp_dir();
    let markup = "<gold>Shiny <shadow:black>thing";

    hostcompat(tmp.path())
        .args(["--host-version", "1.21.4", "text", "render", markup])
        .assert()
        .success()
        .stdout(predicate::str::contains("shadow_color"));

    hostcompat(tmp.path())
        .args(["--host-version", "1.21.1", "text", "render", markup])
        .assert()
        .success()
        .stdout(predicate::str::contains("shadow_color").not())
        .stderr(predicate::str::contains("warning: text shadow dropped"));

    hostcompat(tmp.path())
        .args(["text", "render", "--plain", markup])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shiny thing"));
}

// ============================================================================
// hostcompat boot / completions
// ============================================================================

#[test]
fn test_boot_counts_visits() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("hostcompat.toml"),
        r#"
[host]
state = "state.json"

[app]
namespace = "demo"
motd = "<aqua>Hi there"
"#,
    )
    .unwrap();

    hostcompat(tmp.path())
        .arg("boot")
        .assert()
        .success()
        .stdout(predicate::str::contains("greeter, visit-counter"))
        .stdout(predicate::str::contains("Visits:   1"));

    hostcompat(tmp.path())
        .arg("boot")
        .assert()
        .success()
        .stdout(predicate::str::contains("Visits:   2"));

    hostcompat(tmp.path())
        .args(["data", "get", "entity:server", "demo:visits"])
        .assert()
        .success()
        .stdout(predicate::str::contains("int:2"));
}

#[test]
fn test_boot_cooldown_skips_repeat_visits() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("hostcompat.toml"),
        r#"
[host]
state = "state.json"

[app]
namespace = "demo"
visit_cooldown = "1h"
"#,
    )
    .unwrap();

    hostcompat(tmp.path())
        .arg("boot")
        .assert()
        .success()
        .stdout(predicate::str::contains("Visits:   1"))
        .stdout(predicate::str::contains("not counted").not());

    hostcompat(tmp.path())
        .arg("boot")
        .assert()
        .success()
        .stdout(predicate::str::contains("Visits:   1"))
        .stdout(predicate::str::contains("not counted, last visit was within 1h"));
}

#[test]
fn test_boot_rejects_invalid_cooldown() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("hostcompat.toml"),
        "[app]\nvisit_cooldown = \"later\"\n",
    )
    .unwrap();

    hostcompat(tmp.path())
        .arg("boot")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid app.visit_cooldown `later`"));
}

#[test]
fn test_boot_profile_outputs() {
    let tmp = temp_dir();
    let json = tmp.path().join("reports").join("boot.json");

    hostcompat(tmp.path())
        .arg("boot")
        .arg("--profile")
        .arg("--profile-json")
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::contains("Profiler report @ "))
        .stdout(predicate::str::contains("Duration(ms)"))
        .stdout(predicate::str::contains("  init"))
        .stdout(predicate::str::contains("  stop"));

    let contents = fs::read_to_string(&json).unwrap();
    assert!(contents.contains("\"name\": \"boot\""));
    assert!(contents.contains("\"name\": \"start\""));
}

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    hostcompat(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hostcompat"));
}
