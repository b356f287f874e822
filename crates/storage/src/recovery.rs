// SPDX-License-Identifier: MIT

//! Crash-recovery sweep, run once at startup before the scheduler's first
//! tick: any task or agent caught mid-flight by an unclean shutdown is
//! failed rather than left dangling, and the PR lifecycle backing a task
//! that was interrupted mid-coding regresses to planning so it gets
//! replanned.

use std::collections::BTreeSet;

use orc_core::{AgentStatus, PrStage, TaskStatus};
use tracing::info;

use crate::{Store, StoreResult};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryReport {
    pub tasks_failed: usize,
    pub agents_failed: usize,
    pub pr_lifecycles_regressed: usize,
}

impl Store {
    pub fn recovery_sweep(&self) -> StoreResult<RecoveryReport> {
        let mut report = RecoveryReport::default();
        let mut interrupted_pr_lifecycles = BTreeSet::new();

        for mut task in self.list_tasks_by_status(TaskStatus::Running)? {
            if let Some(pr_lifecycle_id) = task.pr_lifecycle_id {
                interrupted_pr_lifecycles.insert(pr_lifecycle_id);
            }
            task.status = TaskStatus::Failed;
            if let serde_json::Value::Object(map) = &mut task.metadata {
                map.insert("interrupted_by_restart".into(), serde_json::Value::Bool(true));
            }
            self.update_task(&task)?;
            report.tasks_failed += 1;
        }

        for mut agent in self.list_agents_by_status(AgentStatus::Starting)? {
            agent.status = AgentStatus::Failed;
            self.update_agent(&agent)?;
            report.agents_failed += 1;
        }
        for mut agent in self.list_agents_by_status(AgentStatus::Running)? {
            agent.status = AgentStatus::Failed;
            self.update_agent(&agent)?;
            report.agents_failed += 1;
        }

        for id in interrupted_pr_lifecycles {
            let mut pr = self.get_pr_lifecycle(id)?;
            if pr.stage.is_coding_derived() {
                pr.stage = PrStage::Planning;
                self.update_pr_lifecycle(&pr)?;
                report.pr_lifecycles_regressed += 1;
            }
        }

        info!(
            tasks_failed = report.tasks_failed,
            agents_failed = report.agents_failed,
            pr_lifecycles_regressed = report.pr_lifecycles_regressed,
            "recovery sweep complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
