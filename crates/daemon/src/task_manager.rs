// SPDX-License-Identifier: MIT

//! Task state machine: the allowed-transition matrix, the unblock sweep run
//! whenever a task enters `Done`, and the handful of mutating operations the
//! scheduler and IPC listener call.

use chrono::{DateTime, Utc};
use orc_core::{BlockReason, PipelineStatus, Task, TaskId, TaskPriority, TaskStatus};
use orc_storage::Store;

use crate::error::{DaemonError, DaemonResult};

pub struct TaskManager {
    store: Store,
}

impl TaskManager {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Computes the initial status (ready, or blocked/dependency) from the
    /// dependency list, then persists the task.
    pub fn add_task(&self, mut task: Task, now: DateTime<Utc>) -> DaemonResult<Task> {
        task.created_at = now;
        if task.depends_on.is_empty() {
            task.status = TaskStatus::Ready;
            task.block_reason = None;
        } else {
            let all_done = task
                .depends_on
                .iter()
                .map(|id| self.store.get_task(*id))
                .collect::<Result<Vec<_>, _>>()?
                .iter()
                .all(|t| t.status == TaskStatus::Done);
            if all_done {
                task.status = TaskStatus::Ready;
                task.block_reason = None;
            } else {
                task.status = TaskStatus::Blocked;
                task.block_reason = Some(BlockReason::Dependency);
            }
        }
        let id = self.store.add_task(&task)?;
        task.id = id;
        Ok(task)
    }

    pub fn get_task(&self, task_id: TaskId) -> DaemonResult<Task> {
        Ok(self.store.get_task(task_id)?)
    }

    /// Ready tasks in admission order, excluding any still serving out a
    /// quota-backoff or flake retry delay.
    pub fn get_ready_tasks(&self, now: DateTime<Utc>) -> DaemonResult<Vec<Task>> {
        let mut ready: Vec<Task> =
            self.store.list_tasks_by_status(TaskStatus::Ready)?.into_iter().filter(|t| t.retry_delay_elapsed(now)).collect();
        ready.sort_by(|a, b| a.priority.rank().cmp(&b.priority.rank()).then(a.id.cmp(&b.id)));
        Ok(ready)
    }

    /// Move `task` to `to`, validating the transition and applying the
    /// timestamp/block-reason side effects, then running the unblock sweep
    /// if `to` is `Done`.
    pub fn transition(&self, task_id: TaskId, to: TaskStatus, now: DateTime<Utc>) -> DaemonResult<Task> {
        let mut task = self.store.get_task(task_id)?;
        if !task.status.can_transition_to(to) {
            return Err(DaemonError::InvalidTransition(task_id, task.status.to_string(), to.to_string()));
        }
        if to == TaskStatus::Running {
            task.started_at = Some(now);
        }
        if to.is_terminal() {
            task.completed_at = Some(now);
        }
        if task.status == TaskStatus::Blocked && to != TaskStatus::Blocked {
            task.block_reason = None;
        }
        task.status = to;
        self.store.update_task(&task)?;

        if to.is_terminal() {
            if let Some(pipeline_id) = task.pipeline_id {
                self.advance_pipeline(pipeline_id, task.pipeline_step, to)?;
            }
        }
        if to == TaskStatus::Done {
            self.unblock_sweep(task_id)?;
        }
        Ok(task)
    }

    /// Rolls a completed/failed/cancelled pipeline step forward: a `Done`
    /// task advances `current_step` (and completes the pipeline once every
    /// step has run); a `Failed`/`Cancelled` task fails the pipeline outright
    /// rather than leaving it `Active` with a stalled step.
    fn advance_pipeline(&self, pipeline_id: i64, finished_step: u32, to: TaskStatus) -> DaemonResult<()> {
        let mut pipeline = self.store.get_pipeline(pipeline_id)?;
        if pipeline.status != PipelineStatus::Active {
            return Ok(());
        }
        match to {
            TaskStatus::Done => {
                pipeline.current_step = pipeline.current_step.max(finished_step + 1);
                if pipeline.current_step >= pipeline.total_steps {
                    pipeline.status = PipelineStatus::Completed;
                }
            }
            TaskStatus::Failed => pipeline.status = PipelineStatus::Failed,
            TaskStatus::Cancelled => pipeline.status = PipelineStatus::Cancelled,
            _ => {}
        }
        self.store.update_pipeline(&pipeline)?;
        Ok(())
    }

    pub fn mark_blocked(&self, task_id: TaskId, reason: BlockReason) -> DaemonResult<Task> {
        let mut task = self.store.get_task(task_id)?;
        if !task.status.can_transition_to(TaskStatus::Blocked) {
            return Err(DaemonError::InvalidTransition(task_id, task.status.to_string(), TaskStatus::Blocked.to_string()));
        }
        task.status = TaskStatus::Blocked;
        task.block_reason = Some(reason);
        self.store.update_task(&task)?;
        Ok(task)
    }

    /// For each blocked-on-dependency task naming `done_task_id` as a
    /// prerequisite, flips it to ready once every prerequisite is done.
    fn unblock_sweep(&self, done_task_id: TaskId) -> DaemonResult<usize> {
        let mut unblocked = 0;
        for mut candidate in self.store.list_tasks_by_status(TaskStatus::Blocked)? {
            if candidate.block_reason != Some(BlockReason::Dependency) || !candidate.depends_on.contains(&done_task_id) {
                continue;
            }
            let all_done = candidate
                .depends_on
                .iter()
                .map(|id| self.store.get_task(*id))
                .collect::<Result<Vec<_>, _>>()?
                .iter()
                .all(|t| t.status == TaskStatus::Done);
            if all_done {
                candidate.status = TaskStatus::Ready;
                candidate.block_reason = None;
                self.store.update_task(&candidate)?;
                unblocked += 1;
            }
        }
        Ok(unblocked)
    }

    pub fn retry_task(&self, task_id: TaskId) -> DaemonResult<Task> {
        let mut task = self.store.get_task(task_id)?;
        if task.status != TaskStatus::Failed || task.retry_count >= task.max_retries {
            return Err(DaemonError::InvalidTransition(task_id, task.status.to_string(), TaskStatus::Ready.to_string()));
        }
        task.retry_count += 1;
        task.status = TaskStatus::Ready;
        task.workspace = None;
        task.started_at = None;
        task.completed_at = None;
        task.retry_not_before = None;
        self.store.update_task(&task)?;
        Ok(task)
    }

    /// Idempotent: an already-terminal task is returned unchanged.
    pub fn cancel_task(&self, task_id: TaskId, now: DateTime<Utc>) -> DaemonResult<Task> {
        let task = self.store.get_task(task_id)?;
        if task.status.is_terminal() {
            return Ok(task);
        }
        self.transition(task_id, TaskStatus::Cancelled, now)
    }

    pub fn set_priority(&self, task_id: TaskId, priority: TaskPriority) -> DaemonResult<Task> {
        let mut task = self.store.get_task(task_id)?;
        task.priority = priority;
        self.store.update_task(&task)?;
        Ok(task)
    }
}

#[cfg(test)]
#[path = "task_manager_tests.rs"]
mod tests;
