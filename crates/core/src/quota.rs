// SPDX-License-Identifier: MIT

//! Quota status snapshot shared between the quota manager and its observers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub agent_requests_used: u32,
    pub agent_requests_limit: u32,
    pub prompts_used: u32,
    pub prompts_limit: u32,
    pub concurrent_agents: u32,
    pub max_concurrent: u32,
    pub is_paused: bool,
    pub reset_at: chrono::DateTime<chrono::Utc>,
}

impl QuotaStatus {
    pub fn agent_pct(&self) -> f64 {
        if self.agent_requests_limit == 0 {
            return 0.0;
        }
        (self.agent_requests_used as f64 / self.agent_requests_limit as f64) * 100.0
    }

    pub fn prompt_pct(&self) -> f64 {
        if self.prompts_limit == 0 {
            return 0.0;
        }
        (self.prompts_used as f64 / self.prompts_limit as f64) * 100.0
    }
}

#[cfg(test)]
#[path = "quota_tests.rs"]
mod tests;
