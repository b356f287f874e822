// SPDX-License-Identifier: MIT

use super::*;
use crate::config::{Config, GuardrailConfig, QuotaConfig};
use crate::guardrails::Guardrails;
use orc_core::Task;
use std::time::Duration;

fn build(quota_cfg: QuotaConfig) -> (Arc<Scheduler>, Arc<TaskManager>, orc_storage::Store) {
    let store = orc_storage::Store::open_in_memory().unwrap();
    let tasks = Arc::new(TaskManager::new(store.clone()));
    let workspaces = Arc::new(WorkspaceManager::new("/nonexistent/*".to_string(), Duration::from_secs(5)));
    let quota = Arc::new(QuotaManager::new(quota_cfg, store.clone()));
    let guardrails = Arc::new(Guardrails::new(GuardrailConfig::default()));
    let agents = Arc::new(AgentLifecycle::new(store.clone(), workspaces.clone(), quota.clone(), guardrails, Config::default()));
    let events = Arc::new(EventHub::new());
    (Arc::new(Scheduler::new(tasks.clone(), workspaces, quota, agents, events)), tasks, store)
}

#[tokio::test]
async fn tick_blocks_ready_task_when_quota_exhausted() {
    let mut quota_cfg = QuotaConfig::default();
    quota_cfg.daily_agent_requests = 0;
    quota_cfg.reserve_requests = 0;
    let (scheduler, tasks, _store) = build(quota_cfg);

    let task = tasks.add_task(Task::new("A", Utc::now()), Utc::now()).unwrap();
    scheduler.tick().await.unwrap();

    let task = tasks.get_task(task.id).unwrap();
    assert_eq!(task.status, TaskStatus::Blocked);
    assert_eq!(task.block_reason, Some(BlockReason::QuotaExhausted));
}

#[tokio::test]
async fn tick_blocks_ready_task_when_no_free_workspace() {
    let (scheduler, tasks, _store) = build(QuotaConfig::default());

    let task = tasks.add_task(Task::new("A", Utc::now()), Utc::now()).unwrap();
    scheduler.tick().await.unwrap();

    let task = tasks.get_task(task.id).unwrap();
    assert_eq!(task.status, TaskStatus::Blocked);
    assert_eq!(task.block_reason, Some(BlockReason::NoWorkspace));
}

#[tokio::test]
async fn diff_stats_tick_is_a_no_op_with_no_assigned_workspaces() {
    let (scheduler, _tasks, _store) = build(QuotaConfig::default());
    scheduler.diff_stats_tick().await.unwrap();
}
