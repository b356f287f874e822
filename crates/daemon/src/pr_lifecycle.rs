// SPDX-License-Identifier: MIT

//! The 11-stage automaton driving one change from planning through merge.
//! `advance` is the only stage-transition entry point and is idempotent —
//! calling it again from a stage with nothing new to observe is a no-op.

use chrono::Utc;
use orc_core::{PipelineStatus, PrLifecycle, PrLifecycleId, PrStage, Task, TaskPriority};
use orc_storage::Store;

use crate::error::DaemonResult;
use crate::github::{CheckResult, GitHubClient, PrComment};

pub struct PrLifecycleManager<G: GitHubClient> {
    store: Store,
    github: G,
    max_iterations: u32,
}

impl<G: GitHubClient> PrLifecycleManager<G> {
    pub fn new(store: Store, github: G, max_iterations: u32) -> Self {
        Self { store, github, max_iterations }
    }

    pub async fn create_pr(&self, id: PrLifecycleId) -> DaemonResult<PrLifecycle> {
        let mut pr = self.store.get_pr_lifecycle(id)?;
        let number = self.github.create_pr(&pr.title, &pr.branch).await?;
        pr.pr_number = Some(number);
        pr.stage = PrStage::PrCreated;
        self.store.update_pr_lifecycle(&pr)?;
        Ok(pr)
    }

    pub async fn mark_ready(&self, id: PrLifecycleId) -> DaemonResult<PrLifecycle> {
        let mut pr = self.store.get_pr_lifecycle(id)?;
        pr.stage = PrStage::ReadyForReview;
        self.store.update_pr_lifecycle(&pr)?;
        self.advance_pipeline(&pr, PipelineStatus::Completed)?;
        if let Some(number) = pr.pr_number {
            self.github.comment(number, "Ready for human review.").await?;
        }
        Ok(pr)
    }

    /// Moves the pipeline backing `pr` (if any) one step forward and sets its
    /// terminal status once the PR lifecycle itself reaches a terminal stage.
    /// A no-op for PRs not created as part of a tracked pipeline.
    fn advance_pipeline(&self, pr: &PrLifecycle, terminal: PipelineStatus) -> DaemonResult<()> {
        let Some(pipeline_id) = pr.pipeline_id else { return Ok(()) };
        let mut pipeline = self.store.get_pipeline(pipeline_id)?;
        if pipeline.status != PipelineStatus::Active {
            return Ok(());
        }
        pipeline.current_step = (pipeline.current_step + 1).min(pipeline.total_steps);
        if pipeline.current_step >= pipeline.total_steps || terminal == PipelineStatus::Failed {
            pipeline.status = terminal;
        }
        self.store.update_pipeline(&pipeline)?;
        Ok(())
    }

    pub async fn advance(&self, id: PrLifecycleId) -> DaemonResult<PrLifecycle> {
        let mut pr = self.store.get_pr_lifecycle(id)?;
        match pr.stage {
            PrStage::Planning => {}
            PrStage::Coding => {
                pr.stage = PrStage::Prechecks;
                self.store.update_pr_lifecycle(&pr)?;
            }
            PrStage::Prechecks => {
                let mut task = Task::new(format!("[PR {}] run prechecks", pr.title), Utc::now());
                task.branch = pr.branch.clone();
                task.priority = TaskPriority::High;
                task.pr_lifecycle_id = Some(pr.id);
                self.store.add_task(&task)?;
            }
            PrStage::PrCreated => {
                pr.stage = PrStage::CiMonitoring;
                self.store.update_pr_lifecycle(&pr)?;
            }
            PrStage::CiMonitoring => {
                let Some(number) = pr.pr_number else { return Ok(pr) };
                let checks = self.github.list_checks(number).await?;
                let failing: Vec<CheckResult> = checks.into_iter().filter(|c| !c.passed).collect();
                if failing.is_empty() {
                    pr.stage = PrStage::GreptileReview;
                    self.store.update_pr_lifecycle(&pr)?;
                    self.github.comment(number, "All checks passed, requesting review.").await?;
                } else {
                    pr.stage = PrStage::CiFixing;
                    pr.ci_fix_count += 1;
                    self.store.update_pr_lifecycle(&pr)?;
                    for check in failing.iter().take(3) {
                        let logs = self.github.failing_logs(number, &check.name).await.unwrap_or_default();
                        let truncated: String = logs.chars().take(4000).collect();
                        let mut task = Task::new(format!("[PR {}] Fix CI: {}", pr.title, check.name), Utc::now());
                        task.description = truncated;
                        task.branch = pr.branch.clone();
                        task.priority = TaskPriority::High;
                        task.pr_lifecycle_id = Some(pr.id);
                        self.store.add_task(&task)?;
                    }
                }
            }
            PrStage::CiFixing => {
                pr.stage = PrStage::CiMonitoring;
                self.store.update_pr_lifecycle(&pr)?;
            }
            PrStage::GreptileReview => {
                let Some(number) = pr.pr_number else { return Ok(pr) };
                let comments: Vec<PrComment> = self
                    .github
                    .list_comments(number)
                    .await?
                    .into_iter()
                    .filter(|c| c.is_bot && !c.body.trim().is_empty())
                    .collect();
                if !comments.is_empty() {
                    pr.greptile_comments_total += comments.len() as u32;
                    pr.stage = PrStage::AddressingComments;
                    self.store.update_pr_lifecycle(&pr)?;
                    for comment in &comments {
                        let mut task = Task::new(format!("[PR {}] address review comment", pr.title), Utc::now());
                        task.description = comment.body.clone();
                        task.branch = pr.branch.clone();
                        task.pr_lifecycle_id = Some(pr.id);
                        self.store.add_task(&task)?;
                    }
                }
            }
            PrStage::AddressingComments => {
                pr.iteration += 1;
                pr.greptile_comments_resolved += 1;
                if pr.iteration >= pr.max_iterations.max(self.max_iterations) {
                    pr.stage = PrStage::NeedsHuman;
                    self.store.update_pr_lifecycle(&pr)?;
                    self.advance_pipeline(&pr, PipelineStatus::Failed)?;
                } else {
                    pr.stage = PrStage::CiMonitoring;
                    self.store.update_pr_lifecycle(&pr)?;
                }
            }
            PrStage::ReadyForReview | PrStage::NeedsHuman | PrStage::Merged => {}
        }
        Ok(pr)
    }

    /// Advances every non-terminal PR lifecycle one step; called from the
    /// daemon's PR tick. A failure advancing one lifecycle is logged and
    /// does not stop the sweep over the rest.
    pub async fn advance_all_non_terminal(&self) -> DaemonResult<usize> {
        let mut advanced = 0;
        for pr in self.store.list_pr_lifecycles()? {
            if pr.stage.is_terminal() {
                continue;
            }
            match self.advance(pr.id).await {
                Ok(_) => advanced += 1,
                Err(err) => tracing::warn!(pr_lifecycle_id = pr.id, error = %err, "pr lifecycle advance failed"),
            }
        }
        Ok(advanced)
    }
}

#[cfg(test)]
#[path = "pr_lifecycle_tests.rs"]
mod tests;
