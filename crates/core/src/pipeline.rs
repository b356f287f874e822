// SPDX-License-Identifier: MIT

//! Pipeline entity: a sequence of tasks executed in step order and tracked
//! as a group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskId;

pub type PipelineId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Active,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    PipelineStatus {
        Active => "active",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: PipelineId,
    pub name: String,
    pub status: PipelineStatus,
    pub current_step: u32,
    pub total_steps: u32,
    pub task_ids: Vec<TaskId>,
    pub created_at: DateTime<Utc>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, total_steps: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            status: PipelineStatus::Active,
            current_step: 0,
            total_steps,
            task_ids: Vec::new(),
            created_at: now,
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
