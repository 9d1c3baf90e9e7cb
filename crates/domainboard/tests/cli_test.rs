//! Integration tests for the `domainboard` CLI binary.
//!
//! These tests cover argument parsing, help output, shell completions,
//! offline CSV commands and error exit codes, all without a live API.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `domainboard` binary with env isolation.
///
/// Clears all `DOMAINBOARD_*` env vars and points the config file at
/// `config` so tests never touch the user's real configuration.
fn domainboard_cmd(config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("domainboard");
    cmd.env("HOME", "/tmp/domainboard-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/domainboard-cli-test-nonexistent")
        .env("DOMAINBOARD_CONFIG", config)
        .env("NO_COLOR", "1")
        .env_remove("DOMAINBOARD_PROFILE")
        .env_remove("DOMAINBOARD_API_URL")
        .env_remove("DOMAINBOARD_TOKEN")
        .env_remove("DOMAINBOARD_OUTPUT")
        .env_remove("DOMAINBOARD_TIMEOUT")
        .env_remove("DOMAINBOARD_PASSWORD")
        .env_remove("DOMAINBOARD_DEFAULTS__PAGE_SIZE");
    cmd
}

fn isolated() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    (dir, config)
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let (_dir, config) = isolated();
    let output = domainboard_cmd(&config).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let (_dir, config) = isolated();
    domainboard_cmd(&config).arg("--help").assert().success().stdout(
        predicate::str::contains("domain listings")
            .and(predicate::str::contains("domains"))
            .and(predicate::str::contains("tickets"))
            .and(predicate::str::contains("search")),
    );
}

#[test]
fn test_version_flag() {
    let (_dir, config) = isolated();
    domainboard_cmd(&config)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("domainboard"));
}

#[test]
fn test_subcommand_help() {
    let (_dir, config) = isolated();
    domainboard_cmd(&config)
        .args(["domains", "list", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--da")
                .and(predicate::str::contains("--channel"))
                .and(predicate::str::contains("--page-size")),
        );
}

#[test]
fn test_invalid_output_format() {
    let (_dir, config) = isolated();
    let output = domainboard_cmd(&config)
        .args(["--output", "xml", "config", "show"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_generate_for_each_shell() {
    let (_dir, config) = isolated();
    for shell in ["bash", "zsh", "fish"] {
        domainboard_cmd(&config)
            .args(["completions", shell])
            .assert()
            .success()
            .stdout(predicate::str::contains("domainboard"));
    }
}

// ── Offline CSV commands ────────────────────────────────────────────

#[test]
fn test_template_prints_import_header() {
    let (_dir, config) = isolated();
    domainboard_cmd(&config)
        .args(["domains", "template"])
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("Domain Name,Country,Category")
                .and(predicate::str::contains("Ischannel")),
        );
}

#[test]
fn test_template_writes_file() {
    let (dir, config) = isolated();
    let out = dir.path().join("template.csv");
    domainboard_cmd(&config)
        .args(["domains", "template", "--file"])
        .arg(&out)
        .assert()
        .success();
    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("Domain Name,"));
}

#[test]
fn test_import_dry_run_accepts_clean_file() {
    let (dir, config) = isolated();
    let csv = dir.path().join("domains.csv");
    std::fs::write(
        &csv,
        "Domain Name,Country,Category,Price\nhttps://alpha.com/,US,GOV,10\nbeta.org,DE,EDU,25.5\n",
    )
    .unwrap();

    domainboard_cmd(&config)
        .args(["-o", "plain", "domains", "import", "--dry-run"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha.com").and(predicate::str::contains("beta.org")))
        .stderr(predicate::str::contains("2 row(s) valid, 0 invalid"));
}

#[test]
fn test_import_dry_run_reports_bad_rows() {
    let (dir, config) = isolated();
    let csv = dir.path().join("domains.csv");
    std::fs::write(
        &csv,
        "Domain Name,Country,Category,Price\nalpha.com,US,GOV,10\n,US,GOV,5\n",
    )
    .unwrap();

    let output = domainboard_cmd(&config)
        .args(["domains", "import", "--dry-run"])
        .arg(&csv)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("invalid row"));
}

#[test]
fn test_import_dry_run_missing_columns() {
    let (dir, config) = isolated();
    let csv = dir.path().join("domains.csv");
    std::fs::write(&csv, "Domain Name,Country\nalpha.com,US\n").unwrap();

    let output = domainboard_cmd(&config)
        .args(["domains", "import", "--dry-run"])
        .arg(&csv)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Price"));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_config_show_without_file() {
    let (_dir, config) = isolated();
    domainboard_cmd(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_env_overrides_page_size() {
    let (_dir, config) = isolated();
    let output = domainboard_cmd(&config)
        .env("DOMAINBOARD_DEFAULTS__PAGE_SIZE", "25")
        .args(["-o", "json-compact", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""page_size":25"#), "got: {stdout}");
}

#[test]
fn test_config_set_then_profiles() {
    let (_dir, config) = isolated();
    domainboard_cmd(&config)
        .args(["config", "set", "api_url", "https://api.example.com/api"])
        .assert()
        .success();
    assert!(std::fs::read_to_string(&config).unwrap().contains("api.example.com"));

    domainboard_cmd(&config)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let (_dir, config) = isolated();
    let output = domainboard_cmd(&config)
        .args(["config", "set", "password", "hunter2"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_use_unknown_profile() {
    let (_dir, config) = isolated();
    let output = domainboard_cmd(&config)
        .args(["config", "use", "staging"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

// ── Connection errors ───────────────────────────────────────────────

#[test]
fn test_domains_list_without_config() {
    let (_dir, config) = isolated();
    let output = domainboard_cmd(&config)
        .args(["domains", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("config init"));
}

#[test]
fn test_search_unreachable_api() {
    let (dir, config) = isolated();
    let list = dir.path().join("names.txt");
    std::fs::write(&list, "alpha.com\nbeta.org\n").unwrap();

    let output = domainboard_cmd(&config)
        .args(["--api-url", "http://127.0.0.1:1/api", "--token", "x", "search"])
        .arg(&list)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
}

#[test]
fn test_search_missing_file_fails_before_connecting() {
    let (dir, config) = isolated();
    let output = domainboard_cmd(&config)
        .args(["--api-url", "http://127.0.0.1:1/api", "--token", "x", "search"])
        .arg(dir.path().join("absent.txt"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_delete_against_unreachable_api() {
    let (_dir, config) = isolated();
    // Fails on connection before any prompt.
    let output = domainboard_cmd(&config)
        .args([
            "--api-url",
            "http://127.0.0.1:1/api",
            "--token",
            "x",
            "domains",
            "delete",
            "alpha.com",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
}
