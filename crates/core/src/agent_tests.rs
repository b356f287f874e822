// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn push_output_increments_request_count() {
    let mut agent = Agent::new(1, "ws-a", Utc::now());
    agent.push_output("line one".into());
    agent.push_output("line two".into());
    assert_eq!(agent.request_count, 2);
    assert_eq!(agent.output_tail.len(), 2);
}

#[test]
fn output_tail_evicts_oldest_past_capacity() {
    let mut agent = Agent::new(1, "ws-a", Utc::now());
    for i in 0..OUTPUT_TAIL_CAPACITY + 10 {
        agent.push_output(format!("line {i}"));
    }
    assert_eq!(agent.output_tail.len(), OUTPUT_TAIL_CAPACITY);
    assert_eq!(agent.output_tail.front().unwrap(), "line 10");
}

#[test]
fn last_lines_returns_most_recent() {
    let mut agent = Agent::new(1, "ws-a", Utc::now());
    for i in 0..5 {
        agent.push_output(format!("line {i}"));
    }
    assert_eq!(agent.last_lines(2), vec!["line 3", "line 4"]);
}

#[test]
fn status_active_and_terminal_are_disjoint() {
    for status in [
        AgentStatus::Starting,
        AgentStatus::Running,
        AgentStatus::Paused,
        AgentStatus::Completed,
        AgentStatus::Failed,
        AgentStatus::Killed,
    ] {
        assert!(!(status.is_active() && status.is_terminal()));
    }
    assert!(AgentStatus::Running.is_active());
    assert!(AgentStatus::Failed.is_terminal());
}

#[test]
fn agent_ids_are_unique_and_prefixed() {
    let a = AgentId::new();
    let b = AgentId::new();
    assert_ne!(a, b);
    assert!(a.as_str().starts_with("agt-"));
}
