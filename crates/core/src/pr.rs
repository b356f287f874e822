// SPDX-License-Identifier: MIT

//! PR lifecycle entity: the automaton driving one change from coding to merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PrLifecycleId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrStage {
    Planning,
    Coding,
    Prechecks,
    PrCreated,
    CiMonitoring,
    CiFixing,
    GreptileReview,
    AddressingComments,
    ReadyForReview,
    NeedsHuman,
    Merged,
}

crate::simple_display! {
    PrStage {
        Planning => "planning",
        Coding => "coding",
        Prechecks => "prechecks",
        PrCreated => "pr_created",
        CiMonitoring => "ci_monitoring",
        CiFixing => "ci_fixing",
        GreptileReview => "greptile_review",
        AddressingComments => "addressing_comments",
        ReadyForReview => "ready_for_review",
        NeedsHuman => "needs_human",
        Merged => "merged",
    }
}

impl PrStage {
    /// Stages regressed to PLANNING by the crash-recovery sweep: CODING itself
    /// plus every stage reachable only by having started coding.
    pub fn is_coding_derived(self) -> bool {
        matches!(
            self,
            Self::Coding
                | Self::Prechecks
                | Self::PrCreated
                | Self::CiMonitoring
                | Self::CiFixing
                | Self::GreptileReview
                | Self::AddressingComments
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Merged | Self::NeedsHuman | Self::ReadyForReview)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrLifecycle {
    pub id: PrLifecycleId,
    pub pr_number: Option<u64>,
    pub branch: String,
    pub title: String,
    pub stage: PrStage,
    pub iteration: u32,
    pub max_iterations: u32,
    pub ci_fix_count: u32,
    pub precheck_retry_count: u32,
    pub greptile_comments_total: u32,
    pub greptile_comments_resolved: u32,
    pub pipeline_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl PrLifecycle {
    pub fn new(title: impl Into<String>, branch: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            pr_number: None,
            branch: branch.into(),
            title: title.into(),
            stage: PrStage::Coding,
            iteration: 0,
            max_iterations: 3,
            ci_fix_count: 0,
            precheck_retry_count: 0,
            greptile_comments_total: 0,
            greptile_comments_resolved: 0,
            pipeline_id: None,
            created_at: now,
        }
    }
}

#[cfg(test)]
#[path = "pr_tests.rs"]
mod tests;
