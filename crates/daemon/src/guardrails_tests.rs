// SPDX-License-Identifier: MIT

use super::*;
use std::path::PathBuf;

fn guardrails() -> Guardrails {
    Guardrails::new(GuardrailConfig::default())
}

#[test]
fn protected_branch_exact_match_is_blocked() {
    let g = guardrails();
    assert!(!g.check_branch_allowed("main"));
    assert!(!g.check_branch_allowed("master"));
}

#[test]
fn protected_branch_glob_prefix_is_blocked() {
    let g = guardrails();
    assert!(!g.check_branch_allowed("release/1.2"));
}

#[test]
fn feature_branch_is_allowed() {
    let g = guardrails();
    assert!(g.check_branch_allowed("feat/add-webhook"));
}

#[test]
fn workspace_scope_rejects_path_outside_workspace() {
    let g = guardrails();
    assert!(!g.check_workspace_scope(Path::new("/etc/passwd"), Path::new("/work/ws-a")));
    assert!(g.check_workspace_scope(Path::new("/work/ws-a/src/lib.rs"), Path::new("/work/ws-a")));
}

#[test]
fn workspace_scope_rejects_dot_dot_traversal_out_of_the_workspace() {
    let g = guardrails();
    assert!(!g.check_workspace_scope(Path::new("/work/ws-a/foo/../../../etc/passwd"), Path::new("/work/ws-a")));
    assert!(g.check_workspace_scope(Path::new("/work/ws-a/foo/../bar"), Path::new("/work/ws-a")));
}

#[test]
fn blocked_path_check_catches_dot_dot_traversal() {
    let mut config = GuardrailConfig::default();
    config.blocked_paths = vec!["/etc".to_string()];
    let g = Guardrails::new(config);
    assert!(!g.check_path_allowed(Path::new("/work/ws-a/../../etc/passwd")));
}

#[test]
fn force_push_in_shell_tool_call_is_a_violation() {
    let g = guardrails();
    let line = serde_json::json!({"tool": "bash", "input": "git push --force origin main"}).to_string();
    let check = g.check_agent_output(&line);
    assert!(check.should_kill);
    assert_eq!(check.violations[0].kind, "force_push_attempt");
}

#[test]
fn dangerous_command_text_in_model_reasoning_is_not_scanned() {
    let g = guardrails();
    let line = serde_json::json!({"type": "text", "text": "I should avoid rm -rf / on this system"}).to_string();
    let check = g.check_agent_output(&line);
    assert!(!check.should_kill);
}

#[test]
fn plain_text_command_line_is_scanned() {
    let g = guardrails();
    let check = g.check_agent_output("$ rm -rf /");
    assert!(check.should_kill);
    assert_eq!(check.violations[0].kind, "recursive_delete_root");
}

#[test]
fn diff_size_within_limits_is_ok() {
    let g = guardrails();
    let check = g.check_diff_size(10, 500);
    assert!(check.ok);
}

#[test]
fn diff_size_over_file_limit_fails_only_files() {
    let g = guardrails();
    let check = g.check_diff_size(51, 10);
    assert!(!check.files_ok);
    assert!(check.lines_ok);
    assert!(!check.ok);
}

#[test]
fn timeout_check_respects_configured_minutes() {
    let g = guardrails();
    assert!(g.check_timeout(std::time::Duration::from_secs(60)));
    assert!(!g.check_timeout(std::time::Duration::from_secs(31 * 60)));
}

#[test]
fn preamble_names_task_id_and_protected_branches() {
    let g = guardrails();
    let preamble = g.generate_preamble(&PathBuf::from("/work/ws-a"), 7);
    assert!(preamble.contains("task-7"));
    assert!(preamble.contains("main"));
}
