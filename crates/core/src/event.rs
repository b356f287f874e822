// SPDX-License-Identifier: MIT

//! Event vocabulary broadcast by the event hub to dashboard subscribers.
//! Every variant carries its own payload rather than a generic `{type,
//! data}` envelope; `Event::kind()`/`Event::envelope()` produce the
//! wire-level `{type, data, ts}` shape external interfaces expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentId;
use crate::pr::PrLifecycleId;
use crate::task::TaskId;
use crate::workspace::DiffStats;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    AgentOutput { agent_id: AgentId, line: String },
    AgentStatus { agent_id: AgentId, status: String },
    AgentFailure { agent_id: AgentId, task_id: TaskId, last_lines: Vec<String> },
    DiffStats(DiffStats),
    TaskCreated { task_id: TaskId },
    TaskUpdated { task_id: TaskId },
    TaskStarted { task_id: TaskId, agent_id: AgentId },
    TaskDeleted { task_id: TaskId },
    PrLifecycle { id: PrLifecycleId, stage: String },
    PlanApproved { conversation_id: String },
    RuleTriggered { rule_name: String, action_type: String },
    GithubEvent { kind: String, payload: Value },
    ModelsUpdated,
    Init(Value),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AgentOutput { .. } => "agent_output",
            Self::AgentStatus { .. } => "agent_status",
            Self::AgentFailure { .. } => "agent_failure",
            Self::DiffStats(_) => "diff_stats",
            Self::TaskCreated { .. } => "task_created",
            Self::TaskUpdated { .. } => "task_updated",
            Self::TaskStarted { .. } => "task_started",
            Self::TaskDeleted { .. } => "task_deleted",
            Self::PrLifecycle { .. } => "pr_lifecycle",
            Self::PlanApproved { .. } => "plan_approved",
            Self::RuleTriggered { .. } => "rule_triggered",
            Self::GithubEvent { .. } => "github_event",
            Self::ModelsUpdated => "models_updated",
            Self::Init(_) => "init",
        }
    }

    /// Envelope this event as the `{type, data, ts}` shape external
    /// subscribers (the CLI, the dashboard) expect.
    pub fn envelope(&self, ts: DateTime<Utc>) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            map.insert("ts".into(), Value::String(ts.to_rfc3339()));
        }
        value
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
