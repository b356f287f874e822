// SPDX-License-Identifier: MIT

use super::*;
use std::time::Duration;
use tempfile::tempdir;

fn init_repo(dir: &Path) {
    std::process::Command::new("git").arg("init").arg("-q").current_dir(dir).status().unwrap();
    std::process::Command::new("git")
        .args(["config", "user.email", "test@example.com"])
        .current_dir(dir)
        .status()
        .unwrap();
    std::process::Command::new("git").args(["config", "user.name", "test"]).current_dir(dir).status().unwrap();
    std::fs::write(dir.join("README.md"), "hello\n").unwrap();
    std::process::Command::new("git").args(["add", "."]).current_dir(dir).status().unwrap();
    std::process::Command::new("git").args(["commit", "-q", "-m", "init"]).current_dir(dir).status().unwrap();
}

#[test]
fn discover_finds_subdirectories_and_is_idempotent() {
    let root = tempdir().unwrap();
    std::fs::create_dir(root.path().join("ws-a")).unwrap();
    std::fs::create_dir(root.path().join("ws-b")).unwrap();
    let pattern = format!("{}/*", root.path().display());
    let mgr = WorkspaceManager::new(pattern, Duration::from_secs(5));

    let added = mgr.discover().unwrap();
    assert_eq!(added, 2);
    assert_eq!(mgr.discover().unwrap(), 0);
    assert_eq!(mgr.list().len(), 2);
}

#[test]
fn assign_and_release_round_trip() {
    let root = tempdir().unwrap();
    std::fs::create_dir(root.path().join("ws-a")).unwrap();
    let pattern = format!("{}/*", root.path().display());
    let mgr = WorkspaceManager::new(pattern, Duration::from_secs(5));
    mgr.discover().unwrap();

    let free = mgr.get_free().expect("one free workspace");
    assert!(free.is_free());
    mgr.assign(&free.name, 1, AgentId::new()).unwrap();
    assert!(mgr.get_free().is_none());

    mgr.release(&free.name).unwrap();
    assert!(mgr.get_free().is_some());
}

#[test]
fn assign_unknown_workspace_is_an_error() {
    let mgr = WorkspaceManager::new("/nonexistent/*".to_string(), Duration::from_secs(5));
    let err = mgr.assign("ghost", 1, AgentId::new());
    assert!(err.is_err());
}

#[tokio::test]
async fn snapshot_then_rollback_restores_head() {
    let root = tempdir().unwrap();
    let ws_path = root.path().join("ws-a");
    std::fs::create_dir(&ws_path).unwrap();
    init_repo(&ws_path);

    let pattern = format!("{}/*", root.path().display());
    let mgr = WorkspaceManager::new(pattern, Duration::from_secs(5));
    mgr.discover().unwrap();

    let sha = mgr.snapshot("ws-a").await.unwrap();
    assert!(!sha.is_empty());

    std::fs::write(ws_path.join("README.md"), "changed\n").unwrap();
    std::process::Command::new("git").args(["add", "."]).current_dir(&ws_path).status().unwrap();
    std::process::Command::new("git")
        .args(["commit", "-q", "-m", "dirty"])
        .current_dir(&ws_path)
        .status()
        .unwrap();

    mgr.rollback("ws-a").await.unwrap();
    let head = run_git(&ws_path, &["rev-parse", "HEAD"], Duration::from_secs(5)).await.unwrap();
    assert_eq!(head.trim(), sha);
    assert!(mgr.get("ws-a").unwrap().snapshot_sha.is_empty());
}

#[tokio::test]
async fn snapshot_stashes_uncommitted_changes_and_rollback_restores_them() {
    let root = tempdir().unwrap();
    let ws_path = root.path().join("ws-a");
    std::fs::create_dir(&ws_path).unwrap();
    init_repo(&ws_path);

    std::fs::write(ws_path.join("README.md"), "uncommitted tracked change\n").unwrap();
    std::fs::write(ws_path.join("scratch.txt"), "uncommitted untracked file\n").unwrap();

    let pattern = format!("{}/*", root.path().display());
    let mgr = WorkspaceManager::new(pattern, Duration::from_secs(5));
    mgr.discover().unwrap();

    mgr.snapshot("ws-a").await.unwrap();
    assert!(mgr.get("ws-a").unwrap().has_stash);
    let status = run_git(&ws_path, &["status", "--porcelain"], Duration::from_secs(5)).await.unwrap();
    assert!(status.trim().is_empty(), "workspace should be clean right after snapshot");

    mgr.rollback("ws-a").await.unwrap();

    let restored = std::fs::read_to_string(ws_path.join("README.md")).unwrap();
    assert_eq!(restored, "uncommitted tracked change\n");
    assert!(ws_path.join("scratch.txt").exists());

    let ws = mgr.get("ws-a").unwrap();
    assert!(ws.snapshot_sha.is_empty());
    assert!(!ws.has_stash);
}

#[tokio::test]
async fn rollback_with_no_snapshot_is_a_no_op() {
    let root = tempdir().unwrap();
    let ws_path = root.path().join("ws-a");
    std::fs::create_dir(&ws_path).unwrap();
    init_repo(&ws_path);

    let pattern = format!("{}/*", root.path().display());
    let mgr = WorkspaceManager::new(pattern, Duration::from_secs(5));
    mgr.discover().unwrap();

    mgr.rollback("ws-a").await.unwrap();
}

#[tokio::test]
async fn diff_stats_reports_added_and_new_files() {
    let root = tempdir().unwrap();
    let ws_path = root.path().join("ws-a");
    std::fs::create_dir(&ws_path).unwrap();
    init_repo(&ws_path);

    std::fs::write(ws_path.join("README.md"), "hello\nworld\n").unwrap();
    std::fs::write(ws_path.join("new.txt"), "one\ntwo\n").unwrap();

    let pattern = format!("{}/*", root.path().display());
    let mgr = WorkspaceManager::new(pattern, Duration::from_secs(5));
    mgr.discover().unwrap();

    let stats = mgr.get_diff_stats("ws-a").await.unwrap();
    assert_eq!(stats.workspace, "ws-a");
    assert_eq!(stats.total_files, 2);
    assert!(stats.files.iter().any(|f| f.file == "new.txt" && f.status == DiffFileStatus::New));
    assert!(stats.files.iter().any(|f| f.file == "README.md" && f.status == DiffFileStatus::Modified));
}

#[tokio::test]
async fn health_check_fails_outside_a_git_repo() {
    let root = tempdir().unwrap();
    std::fs::create_dir(root.path().join("ws-a")).unwrap();
    let pattern = format!("{}/*", root.path().display());
    let mgr = WorkspaceManager::new(pattern, Duration::from_secs(5));
    mgr.discover().unwrap();

    let healthy = mgr.health_check("ws-a").await.unwrap();
    assert!(!healthy);
}

#[test]
fn glob_expand_with_no_trailing_star_returns_literal_path() {
    let paths = glob_expand("/some/fixed/path").unwrap();
    assert_eq!(paths, vec![PathBuf::from("/some/fixed/path")]);
}
