// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use orc_core::{BlockReason, Task, TaskId, TaskPriority, TaskStatus};
use rusqlite::{params, Row};

use crate::{Store, StoreError, StoreResult};

fn parse_status(s: &str) -> StoreResult<TaskStatus> {
    Ok(match s {
        "pending" => TaskStatus::Pending,
        "blocked" => TaskStatus::Blocked,
        "ready" => TaskStatus::Ready,
        "running" => TaskStatus::Running,
        "done" => TaskStatus::Done,
        "failed" => TaskStatus::Failed,
        "cancelled" => TaskStatus::Cancelled,
        other => return Err(StoreError::Sqlite(rusqlite::Error::InvalidColumnType(
            0,
            format!("unknown task status {other}"),
            rusqlite::types::Type::Text,
        ))),
    })
}

fn parse_priority(s: &str) -> StoreResult<TaskPriority> {
    Ok(match s {
        "critical" => TaskPriority::Critical,
        "high" => TaskPriority::High,
        "normal" => TaskPriority::Normal,
        "low" => TaskPriority::Low,
        other => return Err(StoreError::Sqlite(rusqlite::Error::InvalidColumnType(
            0,
            format!("unknown task priority {other}"),
            rusqlite::types::Type::Text,
        ))),
    })
}

fn parse_block_reason(s: Option<String>) -> StoreResult<Option<BlockReason>> {
    s.map(|s| {
        Ok(match s.as_str() {
            "dependency" => BlockReason::Dependency,
            "quota_exhausted" => BlockReason::QuotaExhausted,
            "no_workspace" => BlockReason::NoWorkspace,
            other => return Err(StoreError::Sqlite(rusqlite::Error::InvalidColumnType(
                0,
                format!("unknown block reason {other}"),
                rusqlite::types::Type::Text,
            ))),
        })
    })
    .transpose()
}

impl Store {
    pub fn add_task(&self, task: &Task) -> StoreResult<TaskId> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO tasks (
                title, description, status, priority, branch, workspace, depends_on,
                block_reason, retry_count, max_retries, pr_lifecycle_id, pipeline_id,
                pipeline_step, pr_number, created_at, started_at, completed_at,
                retry_not_before, metadata
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19)",
            params![
                task.title,
                task.description,
                task.status.to_string(),
                task.priority.to_string(),
                task.branch,
                task.workspace,
                serde_json::to_string(&task.depends_on)?,
                task.block_reason.map(|r| r.to_string()),
                task.retry_count,
                task.max_retries,
                task.pr_lifecycle_id,
                task.pipeline_id,
                task.pipeline_step,
                task.pr_number.map(|v| v as i64),
                task.created_at,
                task.started_at,
                task.completed_at,
                task.retry_not_before,
                serde_json::to_string(&task.metadata)?,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_task(&self, id: TaskId) -> StoreResult<Task> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        let row = rows.next()?.ok_or(StoreError::TaskNotFound(id))?;
        self.hydrate_task(row)
    }

    pub fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM tasks ORDER BY id")?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(self.hydrate_task(row)?);
        }
        Ok(out)
    }

    pub fn list_tasks_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM tasks WHERE status = ?1 ORDER BY id")?;
        let mut rows = stmt.query(params![status.to_string()])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(self.hydrate_task(row)?);
        }
        Ok(out)
    }

    pub fn update_task(&self, task: &Task) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE tasks SET title=?2, description=?3, status=?4, priority=?5, branch=?6,
                workspace=?7, depends_on=?8, block_reason=?9, retry_count=?10, max_retries=?11,
                pr_lifecycle_id=?12, pipeline_id=?13, pipeline_step=?14, pr_number=?15,
                started_at=?16, completed_at=?17, retry_not_before=?18, metadata=?19
             WHERE id=?1",
            params![
                task.id,
                task.title,
                task.description,
                task.status.to_string(),
                task.priority.to_string(),
                task.branch,
                task.workspace,
                serde_json::to_string(&task.depends_on)?,
                task.block_reason.map(|r| r.to_string()),
                task.retry_count,
                task.max_retries,
                task.pr_lifecycle_id,
                task.pipeline_id,
                task.pipeline_step,
                task.pr_number.map(|v| v as i64),
                task.started_at,
                task.completed_at,
                task.retry_not_before,
                serde_json::to_string(&task.metadata)?,
            ],
        )?;
        Ok(())
    }

    pub fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        self.conn.lock().execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn hydrate_task(&self, row: &Row) -> StoreResult<Task> {
        let depends_on: String = row.get("depends_on")?;
        let metadata: String = row.get("metadata")?;
        let status: String = row.get("status")?;
        let priority: String = row.get("priority")?;
        let block_reason: Option<String> = row.get("block_reason")?;
        Ok(Task {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            status: parse_status(&status)?,
            priority: parse_priority(&priority)?,
            branch: row.get("branch")?,
            workspace: row.get("workspace")?,
            depends_on: serde_json::from_str(&depends_on)?,
            block_reason: parse_block_reason(block_reason)?,
            retry_count: row.get("retry_count")?,
            max_retries: row.get("max_retries")?,
            pr_lifecycle_id: row.get("pr_lifecycle_id")?,
            pipeline_id: row.get("pipeline_id")?,
            pipeline_step: row.get("pipeline_step")?,
            pr_number: row.get::<_, Option<i64>>("pr_number")?.map(|v| v as u64),
            created_at: row.get::<_, DateTime<Utc>>("created_at")?,
            started_at: row.get("started_at")?,
            completed_at: row.get("completed_at")?,
            retry_not_before: row.get("retry_not_before")?,
            metadata: serde_json::from_str(&metadata)?,
        })
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
