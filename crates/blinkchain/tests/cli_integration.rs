//! Integration tests for the `blinkchain` binary.
//!
//! These tests exercise the CLI binary via `assert_cmd`: help and version
//! output, config display, and whole `serve` sessions fed through stdin.

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("blinkchain")
}

/// A config path inside a fresh temp dir, so the user's real config is never read.
fn isolated_config() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    (dir, path)
}

fn serve(config: &Path) -> assert_cmd::Command {
    let mut cmd = cli();
    cmd.arg("--config").arg(config).arg("serve");
    cmd
}

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("blinkchain"));
}

#[test]
fn cli_version_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_serve_help_mentions_channel_format() {
    cli()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PIN:COUNT:TYPE"));
}

// ── config ──

#[test]
fn cli_config_json_produces_valid_json() {
    let (_dir, path) = isolated_config();
    let output = cli()
        .arg("--json")
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("config --json should produce valid JSON");
    assert!(json["settings"].is_object());
    assert_eq!(json["settings"]["dma_channel"], 5);
    assert_eq!(json["config_file_exists"], false);
    assert_eq!(json["valid"], false);
}

#[test]
fn cli_config_reads_file() {
    let (_dir, path) = isolated_config();
    std::fs::write(
        &path,
        "dma_channel = 10\n\n[[channels]]\ngpio_pin = 18\ncount = 144\nstrip_type = \"grbw\"\n",
    )
    .unwrap();
    cli()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("(loaded)"))
        .stdout(predicate::str::contains("18:144:grbw"))
        .stdout(predicate::str::contains("10"));
}

#[test]
fn cli_verbose_flag_accepted() {
    let (_dir, path) = isolated_config();
    cli()
        .arg("-v")
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .success();
}

// ── serve ──

#[test]
fn cli_serve_scripted_session() {
    let (_dir, path) = isolated_config();
    serve(&path)
        .args(["--channel", "18:16:grb"])
        .write_stdin(
            "init_canvas 4 4\ninit_pixels 0 0 0 0 4 1 0\nset_pixel 0 0 255 0 0 0\nget_pixel 0 0\n",
        )
        .assert()
        .success()
        .stdout("OK\r\nOK\r\nOK\r\nOK: 0x00ff0000\r\n");
}

#[test]
fn cli_serve_errors_reply_and_continue() {
    let (_dir, path) = isolated_config();
    serve(&path)
        .args(["--channel", "18:4:rgb"])
        .write_stdin("nope\ninit_canvas 1 1\nrender\n")
        .assert()
        .success()
        .stdout("ERR: Unrecognized command: 'nope'\r\nOK\r\nOK\r\n");
}

#[test]
fn cli_serve_uses_config_file_channels() {
    let (_dir, path) = isolated_config();
    std::fs::write(&path, "[[channels]]\ngpio_pin = 18\ncount = 4\n").unwrap();
    serve(&path)
        .write_stdin("init_canvas 2 1\ninit_pixels 0 0 0 0 2 1 0\nfill 0 0 2 1 1 2 3 4\nrender\nget_pixel 1 0\n")
        .assert()
        .success()
        .stdout(predicate::str::ends_with("OK: 0x04010203\r\n"));
}

#[test]
fn cli_serve_empty_input_succeeds() {
    let (_dir, path) = isolated_config();
    serve(&path)
        .args(["--channel", "18:4:rgb"])
        .write_stdin("")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn cli_serve_invalid_strip_type_fails() {
    let (_dir, path) = isolated_config();
    serve(&path)
        .args(["--channel", "18:16:purple"])
        .write_stdin("init_canvas 1 1\n")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Invalid strip type purple"));
}

#[test]
fn cli_serve_malformed_channel_fails() {
    let (_dir, path) = isolated_config();
    serve(&path)
        .args(["--channel", "18-16-grb"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("PIN:COUNT:TYPE"));
}

#[test]
fn cli_serve_without_channels_fails() {
    let (_dir, path) = isolated_config();
    serve(&path)
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("At least one channel"));
}

#[test]
fn cli_serve_eof_mid_command_fails() {
    let (_dir, path) = isolated_config();
    serve(&path)
        .args(["--channel", "18:4:rgb"])
        .write_stdin("init_canvas 1 1\nget_pixel 0")
        .assert()
        .code(1)
        .stdout("OK\r\n")
        .stderr(predicate::str::contains("Transport error"));
}

#[test]
fn cli_serve_oversized_line_fails() {
    let (_dir, path) = isolated_config();
    serve(&path)
        .args(["--channel", "18:4:rgb", "--max-line-bytes", "16"])
        .write_stdin(format!("blit 0 0 1 1 4 {}\n", "A".repeat(40)))
        .assert()
        .code(1)
        .stdout("");
}

#[test]
fn cli_serve_canvas_over_limit_is_command_error() {
    let (_dir, path) = isolated_config();
    std::fs::write(
        &path,
        "max_canvas_cells = 16\n\n[[channels]]\ngpio_pin = 18\ncount = 4\n",
    )
    .unwrap();
    serve(&path)
        .write_stdin("init_canvas 4 4\ninit_canvas 5 4\nget_pixel 3 3\n")
        .assert()
        .success()
        .stdout("OK\r\nERR: Canvas too large: 5x4\r\nOK: 0x00000000\r\n");
}

// ── config --write ──

#[test]
fn cli_config_write_then_serve() {
    let (_dir, path) = isolated_config();
    cli()
        .arg("--config")
        .arg(&path)
        .args(["config", "--dma", "10", "--channel", "18:4:rgbw", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(written)"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# Blinkchain configuration"));
    assert!(text.contains("dma_channel = 10"));
    assert!(text.contains("strip_type = \"rgbw\""));

    serve(&path)
        .write_stdin("init_canvas 1 1\n")
        .assert()
        .success()
        .stdout("OK\r\n");
}

#[test]
fn cli_config_write_refuses_invalid_config() {
    let (_dir, path) = isolated_config();
    cli()
        .arg("--config")
        .arg(&path)
        .args(["config", "--channel", "18:4:purple", "--write"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not writing invalid config"));
    assert!(!path.exists());
}
