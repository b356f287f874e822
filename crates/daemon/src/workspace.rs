// SPDX-License-Identifier: MIT

//! Discovers on-disk working copies, hands them out to agents, and drives
//! the git plumbing (snapshot/rollback/diff) each one needs around a run.

use orc_core::{AgentId, DiffFile, DiffFileStatus, DiffStats, TaskId, Workspace};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::error::{DaemonError, DaemonResult};

pub struct WorkspaceManager {
    workspaces: Mutex<BTreeMap<String, Workspace>>,
    pattern: String,
    git_timeout: Duration,
}

impl WorkspaceManager {
    pub fn new(pattern: impl Into<String>, git_timeout: Duration) -> Self {
        Self { workspaces: Mutex::new(BTreeMap::new()), pattern: pattern.into(), git_timeout }
    }

    /// Glob-expand the configured pattern and add any newly found directory
    /// as a free workspace. Idempotent: existing entries are untouched.
    pub fn discover(&self) -> DaemonResult<usize> {
        let mut added = 0;
        let mut workspaces = self.workspaces.lock();
        for entry in glob_expand(&self.pattern)? {
            let name = entry.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
            if name.is_empty() || workspaces.contains_key(&name) {
                continue;
            }
            let path = entry.to_string_lossy().to_string();
            workspaces.insert(name.clone(), Workspace::discovered(name, path));
            added += 1;
        }
        if added > 0 {
            info!(added, "discovered workspaces");
        }
        Ok(added)
    }

    pub fn get_free(&self) -> Option<Workspace> {
        self.workspaces.lock().values().find(|w| w.is_free()).cloned()
    }

    pub fn assign(&self, name: &str, task_id: TaskId, agent_id: AgentId) -> DaemonResult<()> {
        let mut workspaces = self.workspaces.lock();
        let ws = workspaces.get_mut(name).ok_or(DaemonError::NoFreeWorkspace)?;
        ws.assign(task_id, agent_id);
        Ok(())
    }

    pub fn release(&self, name: &str) -> DaemonResult<()> {
        let mut workspaces = self.workspaces.lock();
        if let Some(ws) = workspaces.get_mut(name) {
            ws.release();
        }
        Ok(())
    }

    pub fn list(&self) -> Vec<Workspace> {
        self.workspaces.lock().values().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<Workspace> {
        self.workspaces.lock().get(name).cloned()
    }

    fn path_of(&self, name: &str) -> DaemonResult<PathBuf> {
        self.workspaces
            .lock()
            .get(name)
            .map(|w| PathBuf::from(&w.path))
            .ok_or_else(|| DaemonError::Git(format!("unknown workspace {name}")))
    }

    /// Records HEAD and sets aside any uncommitted tracked and untracked
    /// changes via `git stash`, so the workspace is clean for the agent to
    /// work in without losing whatever was there before.
    pub async fn snapshot(&self, name: &str) -> DaemonResult<String> {
        let path = self.path_of(name)?;
        let dirty = run_git(&path, &["status", "--porcelain"], self.git_timeout).await?;
        let has_stash = !dirty.trim().is_empty();
        if has_stash {
            run_git(&path, &["stash", "push", "--include-untracked", "-m", "orc-snapshot"], self.git_timeout).await?;
        }
        let sha = run_git(&path, &["rev-parse", "HEAD"], self.git_timeout).await?;
        let sha = sha.trim().to_string();
        let mut workspaces = self.workspaces.lock();
        if let Some(ws) = workspaces.get_mut(name) {
            ws.snapshot_sha = sha.clone();
            ws.has_stash = has_stash;
        }
        Ok(sha)
    }

    /// Resets to the recorded snapshot, restores any changes that were set
    /// aside by the matching `snapshot()` call, then clears both the
    /// snapshot id and the set-aside flag.
    pub async fn rollback(&self, name: &str) -> DaemonResult<()> {
        let path = self.path_of(name)?;
        let (sha, has_stash) = {
            let workspaces = self.workspaces.lock();
            match workspaces.get(name) {
                Some(ws) => (ws.snapshot_sha.clone(), ws.has_stash),
                None => (String::new(), false),
            }
        };
        if sha.is_empty() {
            warn!(workspace = name, "rollback requested with no snapshot recorded");
            return Ok(());
        }
        run_git(&path, &["reset", "--hard", &sha], self.git_timeout).await?;
        if has_stash {
            run_git(&path, &["stash", "pop"], self.git_timeout).await?;
        }
        let mut workspaces = self.workspaces.lock();
        if let Some(ws) = workspaces.get_mut(name) {
            ws.snapshot_sha.clear();
            ws.has_stash = false;
        }
        Ok(())
    }

    pub async fn checkout_branch(&self, name: &str, branch: &str) -> DaemonResult<()> {
        let path = self.path_of(name)?;
        let result = run_git(&path, &["checkout", branch], self.git_timeout).await;
        if result.is_err() {
            run_git(&path, &["checkout", "-b", branch], self.git_timeout).await?;
        }
        let mut workspaces = self.workspaces.lock();
        if let Some(ws) = workspaces.get_mut(name) {
            ws.branch = branch.to_string();
        }
        Ok(())
    }

    pub async fn get_diff_stats(&self, name: &str) -> DaemonResult<DiffStats> {
        let path = self.path_of(name)?;
        let numstat = run_git(&path, &["diff", "--numstat", "HEAD"], self.git_timeout).await?;
        let mut files: Vec<DiffFile> = numstat
            .lines()
            .filter_map(|line| {
                let mut parts = line.split('\t');
                let added = parts.next()?.parse::<u64>().ok()?;
                let removed = parts.next()?.parse::<u64>().ok()?;
                let file = parts.next()?.to_string();
                Some(DiffFile { file, added, removed, status: DiffFileStatus::Modified })
            })
            .collect();

        let untracked = run_git(&path, &["ls-files", "--others", "--exclude-standard"], self.git_timeout).await?;
        for file in untracked.lines().filter(|l| !l.is_empty()) {
            let line_count = std::fs::read_to_string(path.join(file)).map(|c| c.lines().count() as u64).unwrap_or(0);
            files.push(DiffFile { file: file.to_string(), added: line_count, removed: 0, status: DiffFileStatus::New });
        }

        let total_added = files.iter().map(|f| f.added).sum();
        let total_removed = files.iter().map(|f| f.removed).sum();
        let total_files = files.len() as u64;
        Ok(DiffStats { workspace: name.to_string(), files, total_files, total_added, total_removed })
    }

    pub async fn health_check(&self, name: &str) -> DaemonResult<bool> {
        let path = self.path_of(name)?;
        let status = run_git(&path, &["status", "--porcelain"], self.git_timeout).await;
        Ok(status.is_ok())
    }
}

/// Invoke git with a bounded timeout, returning stdout on success.
pub async fn run_git(cwd: &Path, args: &[&str], bound: Duration) -> DaemonResult<String> {
    let fut = Command::new("git").current_dir(cwd).args(args).output();
    let output = timeout(bound, fut).await.map_err(|_| DaemonError::GitTimeout(bound))??;
    if !output.status.success() {
        return Err(DaemonError::Git(String::from_utf8_lossy(&output.stderr).to_string()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn glob_expand(pattern: &str) -> DaemonResult<Vec<PathBuf>> {
    let (base, suffix) = match pattern.rsplit_once('/') {
        Some((base, suffix)) => (base, suffix),
        None => (".", pattern),
    };
    if suffix != "*" {
        return Ok(vec![PathBuf::from(pattern)]);
    }
    let mut out = Vec::new();
    if let Ok(entries) = std::fs::read_dir(base) {
        for entry in entries.flatten() {
            if entry.path().is_dir() {
                out.push(entry.path());
            }
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
