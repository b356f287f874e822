// SPDX-License-Identifier: MIT

use assert_cmd::Command;

#[test]
fn help_lists_top_level_subcommands() {
    let mut cmd = Command::cargo_bin("orc").unwrap();
    cmd.arg("--help");
    let output = cmd.assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("task"));
    assert!(stdout.contains("agent"));
    assert!(stdout.contains("ping"));
}

#[test]
fn ping_without_a_running_daemon_fails_with_a_connection_error() {
    let mut cmd = Command::cargo_bin("orc").unwrap();
    let socket = std::env::temp_dir().join("orc-cli-test-no-daemon.sock");
    cmd.arg("--socket").arg(socket.to_str().unwrap()).arg("ping");
    cmd.assert().failure();
}

#[test]
fn task_add_without_title_is_a_usage_error() {
    let mut cmd = Command::cargo_bin("orc").unwrap();
    cmd.arg("task").arg("add");
    cmd.assert().failure();
}

#[test]
fn pr_advance_without_a_running_daemon_fails_with_a_connection_error() {
    let mut cmd = Command::cargo_bin("orc").unwrap();
    let socket = std::env::temp_dir().join("orc-cli-test-pr-advance.sock");
    cmd.arg("--socket").arg(socket.to_str().unwrap()).arg("pr").arg("advance").arg("1");
    cmd.assert().failure();
}

#[test]
fn version_embeds_the_build_git_hash() {
    let mut cmd = Command::cargo_bin("orc").unwrap();
    cmd.arg("--version");
    let output = cmd.assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains('+'), "expected a version+hash string, got: {stdout}");
}
