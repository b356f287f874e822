// SPDX-License-Identifier: MIT

//! Task entity: the unit of work the scheduler admits onto a workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TaskId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Blocked,
    Ready,
    Running,
    Done,
    Failed,
    Cancelled,
}

crate::simple_display! {
    TaskStatus {
        Pending => "pending",
        Blocked => "blocked",
        Ready => "ready",
        Running => "running",
        Done => "done",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }

    /// Which statuses `self` may move to next.
    pub fn allowed_transitions(self) -> &'static [TaskStatus] {
        use TaskStatus::*;
        match self {
            Pending => &[Blocked, Ready, Cancelled],
            Blocked => &[Ready, Cancelled],
            Ready => &[Running, Blocked, Cancelled],
            Running => &[Done, Failed, Cancelled],
            Failed => &[Ready, Cancelled],
            Done => &[],
            Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, to: TaskStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Critical,
    High,
    Normal,
    Low,
}

impl TaskPriority {
    /// Lower rank sorts first: Critical=0 .. Low=3.
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Normal => 2,
            Self::Low => 3,
        }
    }
}

crate::simple_display! {
    TaskPriority {
        Critical => "critical",
        High => "high",
        Normal => "normal",
        Low => "low",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    Dependency,
    QuotaExhausted,
    NoWorkspace,
}

crate::simple_display! {
    BlockReason {
        Dependency => "dependency",
        QuotaExhausted => "quota_exhausted",
        NoWorkspace => "no_workspace",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub branch: String,
    pub workspace: Option<String>,
    pub depends_on: Vec<TaskId>,
    pub block_reason: Option<BlockReason>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub pr_lifecycle_id: Option<i64>,
    pub pipeline_id: Option<i64>,
    pub pipeline_step: u32,
    pub pr_number: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Set by quota-backoff/flake retries: the task stays `Ready` but is not
    /// admitted by the scheduler until this instant passes.
    pub retry_not_before: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
}

impl Task {
    /// A fresh, not-yet-persisted task; the task manager computes `status`/`block_reason`.
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Ready,
            priority: TaskPriority::Normal,
            branch: String::new(),
            workspace: None,
            depends_on: Vec::new(),
            block_reason: None,
            retry_count: 0,
            max_retries: 2,
            pr_lifecycle_id: None,
            pipeline_id: None,
            pipeline_step: 0,
            pr_number: None,
            created_at: now,
            started_at: None,
            completed_at: None,
            retry_not_before: None,
            metadata: serde_json::json!({}),
        }
    }

    crate::setters! {
        into { description: String, branch: String }
        set { priority: TaskPriority, max_retries: u32, pipeline_step: u32 }
        option { workspace: String, pr_lifecycle_id: i64, pipeline_id: i64, pr_number: u64 }
    }

    /// True once `now` has passed `retry_not_before` (or there is no delay).
    pub fn retry_delay_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.retry_not_before.is_none_or(|not_before| now >= not_before)
    }

    pub fn depends_on(mut self, ids: Vec<TaskId>) -> Self {
        self.depends_on = ids;
        self
    }

    pub fn metadata(mut self, value: serde_json::Value) -> Self {
        self.metadata = value;
        self
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
