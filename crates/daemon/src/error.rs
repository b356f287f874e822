// SPDX-License-Identifier: MIT

use orc_core::TaskId;

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error(transparent)]
    Store(#[from] orc_storage::StoreError),
    #[error("task {0}: invalid transition from {1} to {2}")]
    InvalidTransition(TaskId, String, String),
    #[error("branch {0} is protected")]
    BranchProtected(String),
    #[error("no free workspace available")]
    NoFreeWorkspace,
    #[error("git command failed: {0}")]
    Git(String),
    #[error("git command timed out after {0:?}")]
    GitTimeout(std::time::Duration),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DaemonResult<T> = Result<T, DaemonError>;
