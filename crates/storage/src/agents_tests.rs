// SPDX-License-Identifier: MIT

use super::*;
use crate::Store;
use orc_core::Agent;
use chrono::Utc;

#[test]
fn add_then_get_round_trips() {
    let store = Store::open_in_memory().unwrap();
    let agent = Agent::new(1, "workspace-a", Utc::now());
    store.add_agent(&agent).unwrap();
    let fetched = store.get_agent(agent.id.as_str()).unwrap();
    assert_eq!(fetched.id, agent.id);
    assert_eq!(fetched.workspace, "workspace-a");
    assert_eq!(fetched.status, AgentStatus::Starting);
}

#[test]
fn list_by_status_filters_running_agents() {
    let store = Store::open_in_memory().unwrap();
    let mut running = Agent::new(1, "ws-a", Utc::now());
    running.status = AgentStatus::Running;
    store.add_agent(&running).unwrap();
    store.add_agent(&Agent::new(2, "ws-b", Utc::now())).unwrap();

    let running_agents = store.list_agents_by_status(AgentStatus::Running).unwrap();
    assert_eq!(running_agents.len(), 1);
    assert_eq!(running_agents[0].task_id, 1);
}

#[test]
fn update_agent_persists_completion() {
    let store = Store::open_in_memory().unwrap();
    let agent = Agent::new(1, "ws-a", Utc::now());
    store.add_agent(&agent).unwrap();

    let mut agent = agent;
    agent.status = AgentStatus::Completed;
    agent.completed_at = Some(Utc::now());
    store.update_agent(&agent).unwrap();

    let fetched = store.get_agent(agent.id.as_str()).unwrap();
    assert_eq!(fetched.status, AgentStatus::Completed);
    assert!(fetched.completed_at.is_some());
}

#[test]
fn get_missing_agent_errors() {
    let store = Store::open_in_memory().unwrap();
    assert!(store.get_agent("agt-nonexistent").is_err());
}
