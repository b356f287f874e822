// SPDX-License-Identifier: MIT

//! Spawns and supervises one coding-agent child process per running task:
//! captures its output, polices it with [`crate::guardrails::Guardrails`],
//! meters it against the [`crate::quota::QuotaManager`], and classifies
//! failures into quota-backoff / flake-retry / real-failure.

use chrono::{DateTime, Utc};
use orc_core::{Agent, AgentId, AgentStatus, ChatMessage, ChatRole, Task, TaskId, TaskStatus};
use orc_storage::Store;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};
use crate::guardrails::Guardrails;
use crate::quota::QuotaManager;
use crate::workspace::WorkspaceManager;

const SUPERVISION_READ_DEADLINE: Duration = Duration::from_secs(1);
const DIFF_STATS_CADENCE: Duration = Duration::from_secs(5);
const KILL_GRACE_PERIOD: Duration = Duration::from_secs(5);
const FLAKE_MIN_SECONDS: u64 = 10;
const FLAKE_MIN_RECORDS: usize = 5;
const MAX_FLAKE_RETRIES: u32 = 2;
const MAX_QUOTA_RETRIES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    QuotaBackoff,
    Flake,
    Real,
}

pub struct AgentLifecycle {
    store: Store,
    workspaces: Arc<WorkspaceManager>,
    quota: Arc<QuotaManager>,
    guardrails: Arc<Guardrails>,
    config: Config,
}

impl AgentLifecycle {
    pub fn new(store: Store, workspaces: Arc<WorkspaceManager>, quota: Arc<QuotaManager>, guardrails: Arc<Guardrails>, config: Config) -> Self {
        Self { store, workspaces, quota, guardrails, config }
    }

    /// Returns `None` when quota or branch policy declines the spawn; the
    /// caller (the scheduler) is expected to mark the task blocked/failed
    /// accordingly rather than treat this as an error.
    pub async fn spawn(&self, task: &Task, workspace_name: &str, now: DateTime<Utc>) -> DaemonResult<Option<Agent>> {
        let (can_start, reason) = self.quota.can_start_agent(now)?;
        if !can_start {
            info!(task_id = task.id, reason = %reason, "spawn declined by quota");
            return Ok(None);
        }
        if !self.guardrails.check_branch_allowed(&task.branch) {
            warn!(task_id = task.id, branch = %task.branch, "spawn declined: protected branch");
            return Ok(None);
        }

        let mut agent = Agent::new(task.id, workspace_name, now);
        agent.status = AgentStatus::Starting;
        self.store.add_agent(&agent)?;

        self.workspaces.snapshot(workspace_name).await?;
        if !task.branch.is_empty() {
            self.workspaces.checkout_branch(workspace_name, &task.branch).await?;
        }

        let workspace_path = self
            .workspaces
            .get(workspace_name)
            .ok_or_else(|| DaemonError::NoFreeWorkspace)?
            .path;
        let preamble = self.guardrails.generate_preamble(std::path::Path::new(&workspace_path), task.id);
        let prompt = format!("{preamble}\n{}", task.description);

        let credential = std::env::var(&self.config.credential_env_key).unwrap_or_default();
        let spawned = Command::new(&self.config.agent_binary)
            .arg("-p")
            .arg(&prompt)
            .arg("--yolo")
            .arg("--output-format")
            .arg("stream-json")
            .current_dir(&workspace_path)
            .env(&self.config.credential_env_key, credential)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                error!(task_id = task.id, error = %err, "failed to spawn agent");
                agent.status = AgentStatus::Failed;
                self.store.update_agent(&agent)?;
                self.workspaces.release(workspace_name)?;
                return Ok(None);
            }
        };

        agent.pid = child.id();
        agent.status = AgentStatus::Running;
        self.store.update_agent(&agent)?;
        self.quota.agent_started();

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        tokio::spawn(supervise(
            self.store.clone(),
            self.workspaces.clone(),
            self.quota.clone(),
            self.guardrails.clone(),
            self.config.clone(),
            agent.id.clone(),
            task.id,
            child,
            stdout,
            stderr,
        ));

        Ok(Some(agent))
    }

    pub async fn kill(&self, agent_id: &AgentId) -> DaemonResult<()> {
        let mut agent = self.store.get_agent(agent_id.as_str())?;
        agent.status = AgentStatus::Killed;
        self.store.update_agent(&agent)?;
        self.workspaces.release(&agent.workspace)?;
        self.quota.agent_stopped();
        Ok(())
    }
}

/// Runs for the lifetime of one child process: reads merged stdout/stderr
/// line by line with a bounded per-read deadline, scans each line with
/// guardrails, meters quota, and on exit runs the completion handler.
#[allow(clippy::too_many_arguments)]
async fn supervise(
    store: Store,
    workspaces: Arc<WorkspaceManager>,
    quota: Arc<QuotaManager>,
    guardrails: Arc<Guardrails>,
    config: Config,
    agent_id: AgentId,
    task_id: TaskId,
    mut child: Child,
    stdout: Option<tokio::process::ChildStdout>,
    stderr: Option<tokio::process::ChildStderr>,
) {
    let start = Instant::now();
    let mut record_count: usize = 0;
    let mut last_diff_notify = Instant::now();
    let timeout_budget = Duration::from_secs(config.guardrails.task_timeout_minutes * 60);

    let mut stdout_lines = stdout.map(|s| BufReader::new(s).lines());
    let mut stderr_lines = stderr.map(|s| BufReader::new(s).lines());
    let mut killed = false;

    'supervision: loop {
        let read = async {
            if let Some(lines) = stdout_lines.as_mut() {
                if let Ok(Some(line)) = lines.next_line().await {
                    return Some(line);
                }
            }
            if let Some(lines) = stderr_lines.as_mut() {
                if let Ok(Some(line)) = lines.next_line().await {
                    return Some(line);
                }
            }
            None
        };

        match timeout(SUPERVISION_READ_DEADLINE, read).await {
            Err(_elapsed) => {
                if matches!(child.try_wait(), Ok(Some(_))) {
                    break 'supervision;
                }
                if start.elapsed() > timeout_budget {
                    warn!(%agent_id, task_id, "task timeout exceeded, killing agent");
                    kill_child(&mut child).await;
                    killed = true;
                    break 'supervision;
                }
                if last_diff_notify.elapsed() >= DIFF_STATS_CADENCE {
                    last_diff_notify = Instant::now();
                    if let Ok(agent) = store.get_agent(agent_id.as_str()) {
                        if let Ok(stats) = workspaces.get_diff_stats(&agent.workspace).await {
                            info!(%agent_id, files = stats.total_files, "diff stats notification");
                        }
                    }
                }
            }
            Ok(None) => break 'supervision,
            Ok(Some(line)) => {
                record_count += 1;
                if let Ok(mut agent) = store.get_agent(agent_id.as_str()) {
                    agent.push_output(line.clone());
                    let _ = store.update_agent(&agent);
                }

                let check = guardrails.check_agent_output(&line);
                if check.should_kill {
                    error!(%agent_id, task_id, kind = check.violations[0].kind, "guardrail violation, killing agent");
                    kill_child(&mut child).await;
                    killed = true;
                    break 'supervision;
                }
                let _ = quota.record_prompt(Utc::now(), 1);
            }
        }
    }

    complete(store, workspaces, quota, guardrails, config, agent_id, task_id, child, start, record_count, killed).await;
}

async fn kill_child(child: &mut Child) {
    let _ = child.start_kill();
    let _ = timeout(KILL_GRACE_PERIOD, child.wait()).await;
    if matches!(child.try_wait(), Ok(None)) {
        let _ = child.kill().await;
    }
}

#[allow(clippy::too_many_arguments)]
async fn complete(
    store: Store,
    workspaces: Arc<WorkspaceManager>,
    quota: Arc<QuotaManager>,
    guardrails: Arc<Guardrails>,
    config: Config,
    agent_id: AgentId,
    task_id: TaskId,
    mut child: Child,
    start: Instant,
    record_count: usize,
    killed: bool,
) {
    let exit_status = child.wait().await.ok();
    let success = !killed && exit_status.map(|s| s.success()).unwrap_or(false);
    let now = Utc::now();

    let mut agent = match store.get_agent(agent_id.as_str()) {
        Ok(agent) => agent,
        Err(err) => {
            error!(%agent_id, error = %err, "agent vanished before completion handler");
            return;
        }
    };
    agent.status = if killed {
        AgentStatus::Killed
    } else if success {
        AgentStatus::Completed
    } else {
        AgentStatus::Failed
    };
    agent.completed_at = Some(now);
    let _ = store.update_agent(&agent);
    quota.agent_stopped();

    let diff_stats = workspaces.get_diff_stats(&agent.workspace).await.ok();
    if let Some(stats) = &diff_stats {
        let _ = guardrails.check_diff_size(stats.total_files, stats.total_added + stats.total_removed);
    }

    let summary = format!(
        "agent {} finished: status={} elapsed={}s records={} files_changed={}",
        agent_id,
        agent.status,
        start.elapsed().as_secs(),
        record_count,
        diff_stats.as_ref().map(|s| s.total_files).unwrap_or(0),
    );
    let mut message = ChatMessage { id: 0, conversation_id: task_id.to_string(), role: ChatRole::System, content: summary, created_at: now };
    if agent.status == AgentStatus::Failed {
        let tail = agent.last_lines(10).join("\n");
        message.content.push_str(&format!("\nlast output:\n{tail}"));
    }
    let _ = store.append_chat_message(&message);

    if agent.status == AgentStatus::Failed && config.guardrails.auto_rollback_on_failure {
        let _ = workspaces.rollback(&agent.workspace).await;
    }
    let _ = workspaces.release(&agent.workspace);

    if agent.status == AgentStatus::Failed {
        classify_and_apply(&store, task_id, &agent, killed);
    } else if let Ok(mut task) = store.get_task(task_id) {
        if task.status == TaskStatus::Running {
            task.status = TaskStatus::Done;
            task.completed_at = Some(now);
            let _ = store.update_task(&task);
        }
    }
}

const QUOTA_PATTERNS: &[&str] = &["resource exhausted", "rate limit", "quota exceeded"];
const FLAKE_PATTERNS: &[&str] = &["credential error", "5xx", "connection reset", "connection refused", "timeout", "internal error"];
const QUOTA_RETRY_DELAY: Duration = Duration::from_secs(60);
const FLAKE_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Inspects the last ~30 lines of output to decide whether a failed agent
/// should be quota-backed-off, flake-retried, or marked a real failure.
pub fn classify(output_tail: &[String], elapsed: Duration, record_count: usize, task_quota_retries: u32, task_flake_retries: u32) -> RetryClass {
    let recent: String = output_tail.iter().rev().take(30).cloned().collect::<Vec<_>>().join("\n").to_lowercase();

    if QUOTA_PATTERNS.iter().any(|p| recent.contains(p)) && task_quota_retries < MAX_QUOTA_RETRIES {
        return RetryClass::QuotaBackoff;
    }
    let looks_like_flake = FLAKE_PATTERNS.iter().any(|p| recent.contains(p))
        || (elapsed.as_secs() < FLAKE_MIN_SECONDS && record_count < FLAKE_MIN_RECORDS)
        || record_count == 0;
    if looks_like_flake && task_flake_retries < MAX_FLAKE_RETRIES {
        return RetryClass::Flake;
    }
    RetryClass::Real
}

fn classify_and_apply(store: &Store, task_id: TaskId, agent: &Agent, _killed: bool) {
    let tail: Vec<String> = agent.output_tail.iter().cloned().collect();
    let elapsed = agent
        .completed_at
        .and_then(|c| (c - agent.started_at).to_std().ok())
        .unwrap_or_default();

    let Ok(mut task) = store.get_task(task_id) else { return };
    let quota_retries = task.metadata.get("quota_retry_count").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
    let flake_retries = task.metadata.get("flake_retry_count").and_then(|v| v.as_u64()).unwrap_or(0) as u32;

    let now = Utc::now();
    match classify(&tail, elapsed, agent.request_count as usize, quota_retries, flake_retries) {
        RetryClass::QuotaBackoff => {
            if let serde_json::Value::Object(map) = &mut task.metadata {
                map.insert("quota_retry_count".into(), serde_json::Value::from(quota_retries + 1));
            }
            task.status = TaskStatus::Ready;
            task.workspace = None;
            task.retry_not_before = Some(now + chrono::Duration::from_std(QUOTA_RETRY_DELAY).unwrap_or_default());
            let _ = store.update_task(&task);
        }
        RetryClass::Flake => {
            if let serde_json::Value::Object(map) = &mut task.metadata {
                map.insert("flake_retry_count".into(), serde_json::Value::from(flake_retries + 1));
            }
            task.status = TaskStatus::Ready;
            task.workspace = None;
            task.retry_not_before = Some(now + chrono::Duration::from_std(FLAKE_RETRY_DELAY).unwrap_or_default());
            let _ = store.update_task(&task);
        }
        RetryClass::Real => {
            task.status = TaskStatus::Failed;
            task.retry_not_before = None;
            if let serde_json::Value::Object(map) = &mut task.metadata {
                map.insert("quota_retry_count".into(), serde_json::Value::from(0));
                map.insert("flake_retry_count".into(), serde_json::Value::from(0));
            }
            let _ = store.update_task(&task);
            if let Some(pr_id) = task.pr_lifecycle_id {
                if let Ok(mut pr) = store.get_pr_lifecycle(pr_id) {
                    pr.stage = orc_core::PrStage::Planning;
                    let _ = store.update_pr_lifecycle(&pr);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "agent_lifecycle_tests.rs"]
mod tests;
