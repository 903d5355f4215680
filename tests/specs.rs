//! Behavioral specifications for the resv shell.
//!
//! These tests are black-box: they feed lines to the binary's stdin and
//! verify stdout and stderr. Nothing here touches the network; every
//! exercised command fails or answers before a collaborator call.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use assert_cmd::Command;
use predicates::str::contains;

fn resv() -> Command {
    Command::cargo_bin("resv").unwrap()
}

#[test]
fn shell_greets_and_exits_on_quit() {
    resv()
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(contains("Welcome to the resv shell"));
}

#[test]
fn shell_exits_on_stdin_eof() {
    resv().write_stdin("").assert().success();
}

#[test]
fn help_lists_the_command_surface() {
    resv()
        .write_stdin("help\nquit\n")
        .assert()
        .success()
        .stdout(contains("rais"))
        .stdout(contains("rats"))
        .stdout(contains("search"))
        .stdout(contains("cancel"));
}

#[test]
fn unknown_command_reports_an_error_and_keeps_running() {
    resv()
        .write_stdin("frobnicate\nhelp\nquit\n")
        .assert()
        .success()
        .stderr(contains("ERROR: command unrecognized"))
        .stdout(contains("Commands:"));
}

#[test]
fn list_without_operations_is_an_error() {
    resv()
        .write_stdin("list\nquit\n")
        .assert()
        .success()
        .stderr(contains("ERROR: no operations scheduled"));
}

#[test]
fn logout_without_login_is_an_error() {
    resv()
        .write_stdin("logout\nquit\n")
        .assert()
        .success()
        .stderr(contains("ERROR: no login credentials are stored"));
}

#[test]
fn schedule_without_credentials_is_an_error() {
    resv()
        .write_stdin("rais -v 42 -resD 2030:09:12 -resT 19:00 -ps 2 -i 00:01\nquit\n")
        .assert()
        .success()
        .stderr(contains(
            "ERROR: no login default or login credentials provided",
        ));
}

#[test]
fn missing_required_flag_is_reported() {
    resv()
        .write_stdin("search -l 5\nquit\n")
        .assert()
        .success()
        .stderr(contains("ERROR: missing required flag -n"));
}

#[test]
fn cancel_with_unknown_id_is_reported() {
    resv()
        .write_stdin("cancel -i 99\nquit\n")
        .assert()
        .success()
        .stderr(contains("ERROR: no operation has id 99"));
}
