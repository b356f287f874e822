// SPDX-License-Identifier: MIT

//! Thin adapter around a git-hosting platform's command-line tool. Production
//! code talks to [`GhCliClient`], tests talk to [`NoopGitHubClient`].

use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{DaemonError, DaemonResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrComment {
    pub body: String,
    pub is_bot: bool,
}

#[async_trait]
pub trait GitHubClient: Clone + Send + Sync + 'static {
    async fn create_pr(&self, title: &str, branch: &str) -> DaemonResult<u64>;
    async fn list_checks(&self, pr_number: u64) -> DaemonResult<Vec<CheckResult>>;
    async fn failing_logs(&self, pr_number: u64, check_name: &str) -> DaemonResult<String>;
    async fn list_comments(&self, pr_number: u64) -> DaemonResult<Vec<PrComment>>;
    async fn comment(&self, pr_number: u64, body: &str) -> DaemonResult<()>;
}

/// Invokes the real `gh` CLI with a bounded timeout, matching the workspace
/// manager's git-invocation idiom.
#[derive(Debug, Clone)]
pub struct GhCliClient {
    pub repo: String,
    pub timeout: Duration,
}

impl GhCliClient {
    pub fn new(repo: impl Into<String>, timeout: Duration) -> Self {
        Self { repo: repo.into(), timeout }
    }

    async fn run(&self, args: &[&str]) -> DaemonResult<String> {
        let fut = Command::new("gh").args(["--repo", &self.repo]).args(args).output();
        let output = timeout(self.timeout, fut).await.map_err(|_| DaemonError::GitTimeout(self.timeout))??;
        if !output.status.success() {
            return Err(DaemonError::Git(String::from_utf8_lossy(&output.stderr).to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl GitHubClient for GhCliClient {
    async fn create_pr(&self, title: &str, branch: &str) -> DaemonResult<u64> {
        let out = self.run(&["pr", "create", "--title", title, "--head", branch, "--body", ""]).await?;
        out.lines()
            .rev()
            .find_map(|line| line.rsplit('/').next().and_then(|n| n.parse::<u64>().ok()))
            .ok_or_else(|| DaemonError::Git("could not parse pr number from gh output".into()))
    }

    async fn list_checks(&self, pr_number: u64) -> DaemonResult<Vec<CheckResult>> {
        let out = self.run(&["pr", "checks", &pr_number.to_string()]).await.unwrap_or_default();
        Ok(out
            .lines()
            .filter_map(|line| {
                let mut cols = line.split('\t');
                let name = cols.next()?.to_string();
                let status = cols.next().unwrap_or_default();
                Some(CheckResult { name, passed: status.eq_ignore_ascii_case("pass") })
            })
            .collect())
    }

    async fn failing_logs(&self, pr_number: u64, check_name: &str) -> DaemonResult<String> {
        self.run(&["run", "view", "--log-failed", "--job", check_name, &pr_number.to_string()]).await
    }

    async fn list_comments(&self, pr_number: u64) -> DaemonResult<Vec<PrComment>> {
        let out = self.run(&["pr", "view", &pr_number.to_string(), "--json", "comments"]).await?;
        let value: serde_json::Value = serde_json::from_str(&out).unwrap_or_default();
        Ok(value
            .get("comments")
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .filter_map(|c| {
                let body = c.get("body")?.as_str()?.to_string();
                let author = c.get("author").and_then(|a| a.get("is_bot")).and_then(|v| v.as_bool()).unwrap_or(false);
                Some(PrComment { body, is_bot: author })
            })
            .collect())
    }

    async fn comment(&self, pr_number: u64, body: &str) -> DaemonResult<()> {
        self.run(&["pr", "comment", &pr_number.to_string(), "--body", body]).await?;
        Ok(())
    }
}

/// No-op client for tests: returns deterministic empty/successful results
/// without shelling out.
#[derive(Debug, Clone, Default)]
pub struct NoopGitHubClient;

#[async_trait]
impl GitHubClient for NoopGitHubClient {
    async fn create_pr(&self, _title: &str, _branch: &str) -> DaemonResult<u64> {
        Ok(1)
    }

    async fn list_checks(&self, _pr_number: u64) -> DaemonResult<Vec<CheckResult>> {
        Ok(Vec::new())
    }

    async fn failing_logs(&self, _pr_number: u64, _check_name: &str) -> DaemonResult<String> {
        Ok(String::new())
    }

    async fn list_comments(&self, _pr_number: u64) -> DaemonResult<Vec<PrComment>> {
        Ok(Vec::new())
    }

    async fn comment(&self, _pr_number: u64, _body: &str) -> DaemonResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
