// SPDX-License-Identifier: MIT

use orc_core::TaskId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("task {0} not found")]
    TaskNotFound(TaskId),
    #[error("agent {0} not found")]
    AgentNotFound(String),
    #[error("pr lifecycle {0} not found")]
    PrLifecycleNotFound(i64),
    #[error("pipeline {0} not found")]
    PipelineNotFound(i64),
    #[error("failed to (de)serialize column: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
