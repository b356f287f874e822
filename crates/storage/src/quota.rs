// SPDX-License-Identifier: MIT

use rusqlite::params;

use crate::{Store, StoreResult};

impl Store {
    /// Atomically add `agent_requests`/`prompts` to the day's running total,
    /// creating the row if this is the day's first usage.
    pub fn increment_quota(&self, day: &str, agent_requests: u32, prompts: u32) -> StoreResult<()> {
        self.conn.lock().execute(
            "INSERT INTO quota_usage (day, agent_requests, prompts) VALUES (?1, ?2, ?3)
             ON CONFLICT(day) DO UPDATE SET
                agent_requests = agent_requests + excluded.agent_requests,
                prompts = prompts + excluded.prompts",
            params![day, agent_requests, prompts],
        )?;
        Ok(())
    }

    /// `(agent_requests, prompts)` used so far on `day`; zero if untouched.
    pub fn get_quota_usage(&self, day: &str) -> StoreResult<(u32, u32)> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT agent_requests, prompts FROM quota_usage WHERE day = ?1")?;
        let mut rows = stmt.query(params![day])?;
        match rows.next()? {
            Some(row) => Ok((row.get(0)?, row.get(1)?)),
            None => Ok((0, 0)),
        }
    }
}

#[cfg(test)]
#[path = "quota_tests.rs"]
mod tests;
