// SPDX-License-Identifier: MIT

//! Agent entity: one supervised coding-agent subprocess.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::task::TaskId;

crate::define_id! {
    /// Opaque agent id, e.g. `agt-V1StGXR8_Z5jdHi6B-my`.
    pub struct AgentId("agt-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Starting,
    Running,
    Paused,
    Completed,
    Failed,
    Killed,
}

crate::simple_display! {
    AgentStatus {
        Starting => "starting",
        Running => "running",
        Paused => "paused",
        Completed => "completed",
        Failed => "failed",
        Killed => "killed",
    }
}

impl AgentStatus {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Killed)
    }
}

/// Maximum number of recent stdout lines kept per agent for dashboard/log
/// export; owned exclusively by the supervising loop.
pub const OUTPUT_TAIL_CAPACITY: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub task_id: TaskId,
    pub workspace: String,
    pub pid: Option<u32>,
    pub status: AgentStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub request_count: u64,
    #[serde(skip)]
    pub output_tail: VecDeque<String>,
}

impl Agent {
    pub fn new(task_id: TaskId, workspace: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: AgentId::new(),
            task_id,
            workspace: workspace.into(),
            pid: None,
            status: AgentStatus::Starting,
            started_at: now,
            completed_at: None,
            request_count: 0,
            output_tail: VecDeque::with_capacity(OUTPUT_TAIL_CAPACITY),
        }
    }

    /// Append a line of observed output, evicting the oldest line once the
    /// tail exceeds [`OUTPUT_TAIL_CAPACITY`].
    pub fn push_output(&mut self, line: String) {
        if self.output_tail.len() == OUTPUT_TAIL_CAPACITY {
            self.output_tail.pop_front();
        }
        self.output_tail.push_back(line);
        self.request_count += 1;
    }

    pub fn last_lines(&self, n: usize) -> Vec<String> {
        let skip = self.output_tail.len().saturating_sub(n);
        self.output_tail.iter().skip(skip).cloned().collect()
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
