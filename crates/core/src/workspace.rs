// SPDX-License-Identifier: MIT

//! Workspace entity: a git working tree handed to one agent at a time.

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::task::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceStatus {
    Free,
    Assigned,
    Busy,
}

crate::simple_display! {
    WorkspaceStatus {
        Free => "free",
        Assigned => "assigned",
        Busy => "busy",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub name: String,
    pub path: String,
    pub status: WorkspaceStatus,
    pub assigned_task_id: Option<TaskId>,
    pub agent_id: Option<AgentId>,
    pub branch: String,
    pub snapshot_sha: String,
    pub has_stash: bool,
}

impl Workspace {
    pub fn discovered(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            status: WorkspaceStatus::Free,
            assigned_task_id: None,
            agent_id: None,
            branch: String::new(),
            snapshot_sha: String::new(),
            has_stash: false,
        }
    }

    pub fn is_free(&self) -> bool {
        self.status == WorkspaceStatus::Free
    }

    pub fn assign(&mut self, task_id: TaskId, agent_id: AgentId) {
        self.status = WorkspaceStatus::Assigned;
        self.assigned_task_id = Some(task_id);
        self.agent_id = Some(agent_id);
    }

    pub fn release(&mut self) {
        self.status = WorkspaceStatus::Free;
        self.assigned_task_id = None;
        self.agent_id = None;
    }
}

/// Per-file entry in a diff-stats report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffFile {
    pub file: String,
    pub added: u64,
    pub removed: u64,
    pub status: DiffFileStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffFileStatus {
    Modified,
    New,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub workspace: String,
    pub files: Vec<DiffFile>,
    pub total_files: u64,
    pub total_added: u64,
    pub total_removed: u64,
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
