// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! IPC wire protocol shared between the daemon and the CLI front-end: one
//! `Request` produces one `Response`; `Event`s are pushed independently over
//! a subscription stream.

use orc_core::{Agent, AgentId, PrLifecycle, Task, TaskId, TaskPriority, Workspace};
use serde::{Deserialize, Serialize};

pub use orc_core::Event;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    AddTask { title: String, description: String, priority: TaskPriority, branch: String, depends_on: Vec<TaskId> },
    GetTask { task_id: TaskId },
    ListTasks,
    CancelTask { task_id: TaskId },
    RetryTask { task_id: TaskId },
    ListAgents,
    GetAgent { agent_id: AgentId },
    ListWorkspaces,
    ListPrLifecycles,
    GetPrLifecycle { id: i64 },
    CreatePr { id: i64 },
    AdvancePr { id: i64 },
    MarkPrReady { id: i64 },
    Subscribe,
    Ping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Task(Task),
    Tasks(Vec<Task>),
    Agent(Agent),
    Agents(Vec<Agent>),
    Workspaces(Vec<Workspace>),
    PrLifecycle(PrLifecycle),
    PrLifecycles(Vec<PrLifecycle>),
    Ok,
    Pong,
    Error { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("malformed request: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("connection closed")]
    Closed,
}

/// Encode a value as a single newline-terminated JSON line, the framing used
/// by both the listener and the CLI client over the IPC socket.
pub fn encode_line<T: Serialize>(value: &T) -> Result<String, WireError> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    Ok(line)
}

pub fn decode_line<T: for<'de> Deserialize<'de>>(line: &str) -> Result<T, WireError> {
    Ok(serde_json::from_str(line.trim_end())?)
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
