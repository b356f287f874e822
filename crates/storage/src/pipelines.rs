// SPDX-License-Identifier: MIT

use orc_core::{Pipeline, PipelineId, PipelineStatus};
use rusqlite::{params, Row};

use crate::{Store, StoreError, StoreResult};

fn parse_status(s: &str) -> StoreResult<PipelineStatus> {
    Ok(match s {
        "active" => PipelineStatus::Active,
        "completed" => PipelineStatus::Completed,
        "failed" => PipelineStatus::Failed,
        "cancelled" => PipelineStatus::Cancelled,
        other => return Err(StoreError::Sqlite(rusqlite::Error::InvalidColumnType(
            0,
            format!("unknown pipeline status {other}"),
            rusqlite::types::Type::Text,
        ))),
    })
}

impl Store {
    pub fn add_pipeline(&self, pipeline: &Pipeline) -> StoreResult<PipelineId> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO pipelines (name, status, current_step, total_steps, task_ids, created_at)
             VALUES (?1,?2,?3,?4,?5,?6)",
            params![
                pipeline.name,
                pipeline.status.to_string(),
                pipeline.current_step,
                pipeline.total_steps,
                serde_json::to_string(&pipeline.task_ids)?,
                pipeline.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_pipeline(&self, id: PipelineId) -> StoreResult<Pipeline> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM pipelines WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        let row = rows.next()?.ok_or(StoreError::PipelineNotFound(id))?;
        hydrate_pipeline(row)
    }

    pub fn update_pipeline(&self, pipeline: &Pipeline) -> StoreResult<()> {
        self.conn.lock().execute(
            "UPDATE pipelines SET status=?2, current_step=?3, task_ids=?4 WHERE id=?1",
            params![
                pipeline.id,
                pipeline.status.to_string(),
                pipeline.current_step,
                serde_json::to_string(&pipeline.task_ids)?,
            ],
        )?;
        Ok(())
    }

    pub fn list_pipelines(&self) -> StoreResult<Vec<Pipeline>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM pipelines ORDER BY id")?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(hydrate_pipeline(row)?);
        }
        Ok(out)
    }
}

fn hydrate_pipeline(row: &Row) -> StoreResult<Pipeline> {
    let status: String = row.get("status")?;
    let task_ids: String = row.get("task_ids")?;
    Ok(Pipeline {
        id: row.get("id")?,
        name: row.get("name")?,
        status: parse_status(&status)?,
        current_step: row.get("current_step")?,
        total_steps: row.get("total_steps")?,
        task_ids: serde_json::from_str(&task_ids)?,
        created_at: row.get("created_at")?,
    })
}

#[cfg(test)]
#[path = "pipelines_tests.rs"]
mod tests;
