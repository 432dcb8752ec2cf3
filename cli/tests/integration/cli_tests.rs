//! Integration tests for the flotilla CLI surface.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;

use flotilla_cli::cli::{Cli, Command as CliCommand};
use flotilla_pool::{DEFAULT_MAX_BUFFER, Direction};

fn flotilla() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flotilla"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    flotilla().assert().code(2).stderr(predicate::str::contains(
        "Run commands and copy files across SSH hosts",
    ));
}

#[test]
fn test_cli_help_lists_both_commands() {
    flotilla()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("copy"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    flotilla()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flotilla"));
}

#[test]
fn test_no_color_env_accepts_any_value() {
    // The NO_COLOR convention is presence-based; values like "1" or "yes"
    // must never be rejected as if they were --no-color flag values.
    flotilla()
        .env("NO_COLOR", "yes")
        .arg("--help")
        .assert()
        .success();
}

// --- Argument validation tests ---

#[test]
fn test_run_requires_a_host() {
    flotilla()
        .args(["run", "uptime"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--host"));
}

#[test]
fn test_run_requires_a_command() {
    flotilla()
        .args(["run", "-H", "user@host"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("COMMAND"));
}

#[test]
fn test_copy_requires_src_and_dest() {
    flotilla()
        .args(["copy", "-H", "user@host", "/only-src"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("DEST"));
}

#[test]
fn test_copy_rejects_unknown_direction() {
    flotilla()
        .args(["copy", "-H", "user@host", "/a", "/b", "--direction", "sideways"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_strict_lists_possible_values() {
    flotilla()
        .args(["run", "-H", "user@host", "--strict", "sometimes", "uptime"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("accept-new"));
}

// --- Endpoint validation surfaces before any process runs ---

#[test]
fn test_run_rejects_malformed_remote() {
    flotilla()
        .args(["run", "-H", "not a remote", "uptime"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not a valid remote"));
}

#[test]
fn test_copy_rejects_malformed_remote() {
    flotilla()
        .args(["copy", "-H", "@@", "/a", "/b"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not a valid remote"));
}

#[test]
fn test_quiet_does_not_swallow_errors() {
    flotilla()
        .args(["run", "--quiet", "-H", "not a remote", "uptime"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not a valid remote"));
}

// --- Parsed defaults ---

#[test]
fn test_run_collects_trailing_command_words() {
    let cli = Cli::try_parse_from(["flotilla", "run", "-H", "u@h", "sudo", "ls", "-la"])
        .expect("parse");
    match cli.command {
        CliCommand::Run(args) => {
            assert_eq!(args.command, ["sudo", "ls", "-la"]);
            assert_eq!(args.max_buffer, DEFAULT_MAX_BUFFER);
            assert_eq!(args.timeout, None);
        }
        CliCommand::Copy(_) => panic!("expected run"),
    }
}

#[test]
fn test_copy_defaults_match_the_library() {
    let cli = Cli::try_parse_from(["flotilla", "copy", "-H", "u@h", "/a", "/b"]).expect("parse");
    match cli.command {
        CliCommand::Copy(args) => {
            assert_eq!(args.direction, Direction::LocalToRemote);
            assert!(args.excludes.is_empty());
            assert!(args.rsync_args.is_empty());
            assert!(!args.use_shim);
            assert_eq!(args.max_buffer, DEFAULT_MAX_BUFFER);
        }
        CliCommand::Run(_) => panic!("expected copy"),
    }
}

#[test]
fn test_copy_accepts_hyphenated_rsync_args() {
    let cli = Cli::try_parse_from([
        "flotilla",
        "copy",
        "-H",
        "u@h",
        "/a",
        "/b",
        "--rsync-arg",
        "--delete",
        "--exclude",
        "node_modules",
    ])
    .expect("parse");
    match cli.command {
        CliCommand::Copy(args) => {
            assert_eq!(args.rsync_args, ["--delete"]);
            assert_eq!(args.excludes, ["node_modules"]);
        }
        CliCommand::Run(_) => panic!("expected copy"),
    }
}
