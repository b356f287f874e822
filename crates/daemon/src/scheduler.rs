// SPDX-License-Identifier: MIT

//! Two independent ticking loops: the main tick admits ready tasks onto free
//! workspaces and spawns agents for them; the diff-stats tick broadcasts
//! periodic diff snapshots for every workspace with a non-empty diff.

use chrono::Utc;
use orc_core::{BlockReason, Event, TaskStatus};
use std::sync::Arc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::agent_lifecycle::AgentLifecycle;
use crate::error::DaemonResult;
use crate::event_hub::EventHub;
use crate::quota::QuotaManager;
use crate::task_manager::TaskManager;
use crate::workspace::WorkspaceManager;

pub struct Scheduler {
    tasks: Arc<TaskManager>,
    workspaces: Arc<WorkspaceManager>,
    quota: Arc<QuotaManager>,
    agents: Arc<AgentLifecycle>,
    events: Arc<EventHub>,
}

impl Scheduler {
    pub fn new(tasks: Arc<TaskManager>, workspaces: Arc<WorkspaceManager>, quota: Arc<QuotaManager>, agents: Arc<AgentLifecycle>, events: Arc<EventHub>) -> Self {
        Self { tasks, workspaces, quota, agents, events }
    }

    /// One pass of the main tick: resets quota if the day rolled over, then
    /// admits ready tasks in priority order onto free workspaces.
    pub async fn tick(&self) -> DaemonResult<()> {
        let now = Utc::now();
        self.quota.check_reset(now)?;

        for task in self.tasks.get_ready_tasks(now)? {
            let (can_start, reason) = self.quota.can_start_agent(now)?;
            if !can_start {
                info!(task_id = task.id, reason = %reason, "task blocked by quota");
                self.tasks.mark_blocked(task.id, BlockReason::QuotaExhausted)?;
                continue;
            }

            let workspace = task
                .workspace
                .as_ref()
                .and_then(|name| self.workspaces.get(name))
                .filter(|w| w.is_free())
                .or_else(|| self.workspaces.get_free());

            let Some(workspace) = workspace else {
                warn!(task_id = task.id, "no free workspace available");
                self.tasks.mark_blocked(task.id, BlockReason::NoWorkspace)?;
                continue;
            };

            let running = self.tasks.transition(task.id, TaskStatus::Running, now)?;
            match self.agents.spawn(&running, &workspace.name, now).await? {
                Some(agent) => {
                    self.workspaces.assign(&workspace.name, running.id, agent.id.clone())?;
                    self.events.broadcast(Event::TaskStarted { task_id: running.id, agent_id: agent.id });
                }
                None => {
                    self.tasks.transition(running.id, TaskStatus::Failed, now)?;
                }
            }
        }
        Ok(())
    }

    /// One pass of the diff-stats tick: broadcasts a `DiffStats` event for
    /// every assigned/busy workspace whose working tree has a non-empty diff.
    pub async fn diff_stats_tick(&self) -> DaemonResult<()> {
        for workspace in self.workspaces.list() {
            if workspace.is_free() {
                continue;
            }
            let stats = self.workspaces.get_diff_stats(&workspace.name).await?;
            if stats.total_files > 0 {
                self.events.broadcast(Event::DiffStats(stats));
            }
        }
        Ok(())
    }

    /// Runs both ticking loops until `shutdown` is cancelled.
    pub async fn run(self: Arc<Self>, main_tick: std::time::Duration, diff_tick: std::time::Duration, shutdown: CancellationToken) {
        let main_scheduler = self.clone();
        let main_shutdown = shutdown.clone();
        let main_loop = tokio::spawn(async move {
            let mut ticker = interval(main_tick);
            loop {
                tokio::select! {
                    _ = main_shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(err) = main_scheduler.tick().await {
                            warn!(error = %err, "scheduler main tick failed");
                        }
                    }
                }
            }
        });

        let diff_scheduler = self.clone();
        let diff_shutdown = shutdown.clone();
        let diff_loop = tokio::spawn(async move {
            let mut ticker = interval(diff_tick);
            loop {
                tokio::select! {
                    _ = diff_shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(err) = diff_scheduler.diff_stats_tick().await {
                            warn!(error = %err, "scheduler diff-stats tick failed");
                        }
                    }
                }
            }
        });

        let _ = tokio::join!(main_loop, diff_loop);
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
