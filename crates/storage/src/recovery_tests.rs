// SPDX-License-Identifier: MIT

use super::*;
use crate::Store;
use chrono::Utc;
use orc_core::{Agent, PrLifecycle, Task};

#[test]
fn sweep_fails_running_tasks_and_marks_metadata() {
    let store = Store::open_in_memory().unwrap();
    let mut task = Task::new("in flight", Utc::now());
    task.status = TaskStatus::Running;
    let id = store.add_task(&task).unwrap();

    let report = store.recovery_sweep().unwrap();
    assert_eq!(report.tasks_failed, 1);

    let fetched = store.get_task(id).unwrap();
    assert_eq!(fetched.status, TaskStatus::Failed);
    assert_eq!(fetched.metadata["interrupted_by_restart"], serde_json::json!(true));
}

#[test]
fn sweep_fails_starting_and_running_agents() {
    let store = Store::open_in_memory().unwrap();
    let mut starting = Agent::new(1, "ws-a", Utc::now());
    starting.status = AgentStatus::Starting;
    store.add_agent(&starting).unwrap();
    let mut running = Agent::new(2, "ws-b", Utc::now());
    running.status = AgentStatus::Running;
    store.add_agent(&running).unwrap();

    let report = store.recovery_sweep().unwrap();
    assert_eq!(report.agents_failed, 2);
}

#[test]
fn sweep_regresses_pr_lifecycle_backing_an_interrupted_task_to_planning() {
    let store = Store::open_in_memory().unwrap();
    let mut pr = PrLifecycle::new("fix ci", "fix/ci", Utc::now());
    pr.stage = PrStage::CiFixing;
    let pr_id = store.add_pr_lifecycle(&pr).unwrap();

    let mut task = Task::new("fix ci", Utc::now());
    task.status = TaskStatus::Running;
    task.pr_lifecycle_id = Some(pr_id);
    store.add_task(&task).unwrap();

    let report = store.recovery_sweep().unwrap();
    assert_eq!(report.pr_lifecycles_regressed, 1);

    let fetched = store.get_pr_lifecycle(pr_id).unwrap();
    assert_eq!(fetched.stage, PrStage::Planning);
}

#[test]
fn sweep_leaves_coding_derived_pr_lifecycle_alone_when_no_task_references_it() {
    let store = Store::open_in_memory().unwrap();
    let mut pr = PrLifecycle::new("fix ci", "fix/ci", Utc::now());
    pr.stage = PrStage::CiFixing;
    let pr_id = store.add_pr_lifecycle(&pr).unwrap();

    let report = store.recovery_sweep().unwrap();
    assert_eq!(report.pr_lifecycles_regressed, 0);

    let fetched = store.get_pr_lifecycle(pr_id).unwrap();
    assert_eq!(fetched.stage, PrStage::CiFixing);
}

#[test]
fn second_sweep_with_no_new_interruptions_is_a_no_op() {
    let store = Store::open_in_memory().unwrap();
    let mut task = Task::new("in flight", Utc::now());
    task.status = TaskStatus::Running;
    store.add_task(&task).unwrap();

    store.recovery_sweep().unwrap();
    let second = store.recovery_sweep().unwrap();
    assert_eq!(second.tasks_failed, 0);
}
