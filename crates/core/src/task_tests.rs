// SPDX-License-Identifier: MIT

use super::*;
use proptest::prelude::*;

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Pending),
        Just(TaskStatus::Ready),
        Just(TaskStatus::Blocked),
        Just(TaskStatus::Running),
        Just(TaskStatus::Done),
        Just(TaskStatus::Failed),
        Just(TaskStatus::Cancelled),
    ]
}

proptest! {
    #[test]
    fn task_status_serde_roundtrip(status in arb_status()) {
        let json = serde_json::to_string(&status).unwrap();
        let parsed: TaskStatus = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(status, parsed);
    }
}

#[test]
fn pending_can_reach_ready_blocked_or_cancelled() {
    assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Ready));
    assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Blocked));
    assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Cancelled));
    assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Running));
}

#[test]
fn terminal_statuses_have_no_outgoing_transitions() {
    assert!(TaskStatus::Done.allowed_transitions().is_empty());
    assert!(TaskStatus::Cancelled.allowed_transitions().is_empty());
}

#[test]
fn failed_can_retry_back_to_ready() {
    assert!(TaskStatus::Failed.can_transition_to(TaskStatus::Ready));
    assert!(!TaskStatus::Failed.can_transition_to(TaskStatus::Running));
}

#[test]
fn priority_rank_orders_critical_first() {
    let mut ranks = [
        TaskPriority::Low,
        TaskPriority::Critical,
        TaskPriority::Normal,
    ];
    ranks.sort_by_key(|p| p.rank());
    assert_eq!(
        ranks,
        [TaskPriority::Critical, TaskPriority::Normal, TaskPriority::Low]
    );
}

#[test]
fn terminal_helper_matches_done_failed_cancelled() {
    assert!(TaskStatus::Done.is_terminal());
    assert!(TaskStatus::Failed.is_terminal());
    assert!(TaskStatus::Cancelled.is_terminal());
    assert!(!TaskStatus::Running.is_terminal());
}
