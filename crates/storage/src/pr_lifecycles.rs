// SPDX-License-Identifier: MIT

use orc_core::{PrLifecycle, PrLifecycleId, PrStage};
use rusqlite::{params, Row};

use crate::{Store, StoreError, StoreResult};

fn parse_stage(s: &str) -> StoreResult<PrStage> {
    Ok(match s {
        "planning" => PrStage::Planning,
        "coding" => PrStage::Coding,
        "prechecks" => PrStage::Prechecks,
        "pr_created" => PrStage::PrCreated,
        "ci_monitoring" => PrStage::CiMonitoring,
        "ci_fixing" => PrStage::CiFixing,
        "greptile_review" => PrStage::GreptileReview,
        "addressing_comments" => PrStage::AddressingComments,
        "ready_for_review" => PrStage::ReadyForReview,
        "needs_human" => PrStage::NeedsHuman,
        "merged" => PrStage::Merged,
        other => return Err(StoreError::Sqlite(rusqlite::Error::InvalidColumnType(
            0,
            format!("unknown pr stage {other}"),
            rusqlite::types::Type::Text,
        ))),
    })
}

impl Store {
    pub fn add_pr_lifecycle(&self, pr: &PrLifecycle) -> StoreResult<PrLifecycleId> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO pr_lifecycles (
                pr_number, branch, title, stage, iteration, max_iterations, ci_fix_count,
                precheck_retry_count, greptile_comments_total, greptile_comments_resolved,
                pipeline_id, created_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
            params![
                pr.pr_number.map(|v| v as i64),
                pr.branch,
                pr.title,
                pr.stage.to_string(),
                pr.iteration,
                pr.max_iterations,
                pr.ci_fix_count,
                pr.precheck_retry_count,
                pr.greptile_comments_total,
                pr.greptile_comments_resolved,
                pr.pipeline_id,
                pr.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_pr_lifecycle(&self, id: PrLifecycleId) -> StoreResult<PrLifecycle> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM pr_lifecycles WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        let row = rows.next()?.ok_or(StoreError::PrLifecycleNotFound(id))?;
        hydrate_pr(row)
    }

    pub fn list_pr_lifecycles(&self) -> StoreResult<Vec<PrLifecycle>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM pr_lifecycles ORDER BY id")?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(hydrate_pr(row)?);
        }
        Ok(out)
    }

    pub fn list_pr_lifecycles_in_coding_derived_stages(&self) -> StoreResult<Vec<PrLifecycle>> {
        Ok(self.list_pr_lifecycles()?.into_iter().filter(|pr| pr.stage.is_coding_derived()).collect())
    }

    pub fn update_pr_lifecycle(&self, pr: &PrLifecycle) -> StoreResult<()> {
        self.conn.lock().execute(
            "UPDATE pr_lifecycles SET pr_number=?2, stage=?3, iteration=?4, ci_fix_count=?5,
                precheck_retry_count=?6, greptile_comments_total=?7, greptile_comments_resolved=?8
             WHERE id=?1",
            params![
                pr.id,
                pr.pr_number.map(|v| v as i64),
                pr.stage.to_string(),
                pr.iteration,
                pr.ci_fix_count,
                pr.precheck_retry_count,
                pr.greptile_comments_total,
                pr.greptile_comments_resolved,
            ],
        )?;
        Ok(())
    }
}

fn hydrate_pr(row: &Row) -> StoreResult<PrLifecycle> {
    let stage: String = row.get("stage")?;
    Ok(PrLifecycle {
        id: row.get("id")?,
        pr_number: row.get::<_, Option<i64>>("pr_number")?.map(|v| v as u64),
        branch: row.get("branch")?,
        title: row.get("title")?,
        stage: parse_stage(&stage)?,
        iteration: row.get("iteration")?,
        max_iterations: row.get("max_iterations")?,
        ci_fix_count: row.get("ci_fix_count")?,
        precheck_retry_count: row.get("precheck_retry_count")?,
        greptile_comments_total: row.get("greptile_comments_total")?,
        greptile_comments_resolved: row.get("greptile_comments_resolved")?,
        pipeline_id: row.get("pipeline_id")?,
        created_at: row.get("created_at")?,
    })
}

#[cfg(test)]
#[path = "pr_lifecycles_tests.rs"]
mod tests;
