// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn discovered_workspace_starts_free() {
    let ws = Workspace::discovered("proj-a", "/home/u/proj-a");
    assert!(ws.is_free());
    assert_eq!(ws.assigned_task_id, None);
}

#[test]
fn assign_then_release_clears_back_references() {
    let mut ws = Workspace::discovered("proj-a", "/home/u/proj-a");
    ws.assign(7, AgentId::new());
    assert_eq!(ws.status, WorkspaceStatus::Assigned);
    assert_eq!(ws.assigned_task_id, Some(7));

    ws.release();
    assert!(ws.is_free());
    assert_eq!(ws.assigned_task_id, None);
    assert_eq!(ws.agent_id, None);
}
