// SPDX-License-Identifier: MIT

//! Shared error vocabulary used across the workspace.

use thiserror::Error;

/// Errors raised by the task state machine, independent of storage.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("cannot transition task {task_id} from {from} to {to}")]
    InvalidTransition {
        task_id: i64,
        from: crate::task::TaskStatus,
        to: crate::task::TaskStatus,
    },
    #[error("task {0} not found")]
    NotFound(i64),
    #[error("task {task_id} has no retries left ({retry_count}/{max_retries})")]
    RetriesExhausted {
        task_id: i64,
        retry_count: u32,
        max_retries: u32,
    },
}

/// Errors raised while driving the PR lifecycle automaton.
#[derive(Debug, Error)]
pub enum PrLifecycleError {
    #[error("pr lifecycle {0} not found")]
    NotFound(i64),
    #[error("pr lifecycle {0} has no pr number assigned yet")]
    NoPrNumber(i64),
}
