// SPDX-License-Identifier: MIT

use orc_core::{Agent, AgentId, AgentStatus};
use rusqlite::{params, Row};

use crate::{Store, StoreError, StoreResult};

fn parse_status(s: &str) -> StoreResult<AgentStatus> {
    Ok(match s {
        "starting" => AgentStatus::Starting,
        "running" => AgentStatus::Running,
        "paused" => AgentStatus::Paused,
        "completed" => AgentStatus::Completed,
        "failed" => AgentStatus::Failed,
        "killed" => AgentStatus::Killed,
        other => return Err(StoreError::Sqlite(rusqlite::Error::InvalidColumnType(
            0,
            format!("unknown agent status {other}"),
            rusqlite::types::Type::Text,
        ))),
    })
}

impl Store {
    pub fn add_agent(&self, agent: &Agent) -> StoreResult<()> {
        self.conn.lock().execute(
            "INSERT INTO agents (id, task_id, workspace, pid, status, started_at, completed_at, request_count)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            params![
                agent.id.as_str(),
                agent.task_id,
                agent.workspace,
                agent.pid,
                agent.status.to_string(),
                agent.started_at,
                agent.completed_at,
                agent.request_count as i64,
            ],
        )?;
        Ok(())
    }

    pub fn get_agent(&self, id: &str) -> StoreResult<Agent> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM agents WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        let row = rows.next()?.ok_or_else(|| StoreError::AgentNotFound(id.to_string()))?;
        hydrate_agent(row)
    }

    pub fn list_agents(&self) -> StoreResult<Vec<Agent>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM agents ORDER BY started_at")?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(hydrate_agent(row)?);
        }
        Ok(out)
    }

    pub fn list_agents_by_status(&self, status: AgentStatus) -> StoreResult<Vec<Agent>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM agents WHERE status = ?1 ORDER BY started_at")?;
        let mut rows = stmt.query(params![status.to_string()])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(hydrate_agent(row)?);
        }
        Ok(out)
    }

    pub fn update_agent(&self, agent: &Agent) -> StoreResult<()> {
        self.conn.lock().execute(
            "UPDATE agents SET pid=?2, status=?3, completed_at=?4, request_count=?5 WHERE id=?1",
            params![
                agent.id.as_str(),
                agent.pid,
                agent.status.to_string(),
                agent.completed_at,
                agent.request_count as i64,
            ],
        )?;
        Ok(())
    }
}

fn hydrate_agent(row: &Row) -> StoreResult<Agent> {
    let status: String = row.get("status")?;
    let id: String = row.get("id")?;
    Ok(Agent {
        id: AgentId::from(id.as_str()),
        task_id: row.get("task_id")?,
        workspace: row.get("workspace")?,
        pid: row.get::<_, Option<i64>>("pid")?.map(|v| v as u32),
        status: parse_status(&status)?,
        started_at: row.get("started_at")?,
        completed_at: row.get("completed_at")?,
        request_count: row.get::<_, i64>("request_count")? as u64,
        output_tail: Default::default(),
    })
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
