// SPDX-License-Identifier: MIT

//! Tracks daily agent-request/prompt usage against a provider-imposed quota,
//! pausing new agent starts once the budget is exhausted or a configured
//! threshold is crossed, and auto-resuming once the day key rolls over.

use chrono::{DateTime, Duration, TimeZone, Utc};
use orc_core::QuotaStatus;
use parking_lot::Mutex;
use tracing::warn;

use crate::config::QuotaConfig;

pub struct QuotaManager {
    config: QuotaConfig,
    store: orc_storage::Store,
    paused: Mutex<bool>,
    active_agents: Mutex<u32>,
}

impl QuotaManager {
    pub fn new(config: QuotaConfig, store: orc_storage::Store) -> Self {
        Self { config, store, paused: Mutex::new(false), active_agents: Mutex::new(0) }
    }

    fn today(&self, now: DateTime<Utc>) -> String {
        (now + Duration::minutes(self.config.day_offset_minutes as i64)).format("%Y-%m-%d").to_string()
    }

    pub fn status(&self, now: DateTime<Utc>) -> orc_storage::StoreResult<QuotaStatus> {
        let (agent_requests_used, prompts_used) = self.store.get_quota_usage(&self.today(now))?;
        Ok(QuotaStatus {
            agent_requests_used,
            agent_requests_limit: self.config.daily_agent_requests,
            prompts_used,
            prompts_limit: self.config.daily_prompts,
            concurrent_agents: *self.active_agents.lock(),
            max_concurrent: self.config.max_concurrent,
            is_paused: *self.paused.lock(),
            reset_at: self.next_reset(now),
        })
    }

    pub fn can_start_agent(&self, now: DateTime<Utc>) -> orc_storage::StoreResult<(bool, String)> {
        if *self.paused.lock() {
            return Ok((false, "quota is paused".into()));
        }
        if *self.active_agents.lock() >= self.config.max_concurrent {
            return Ok((false, format!("max concurrent agents ({}) reached", self.config.max_concurrent)));
        }

        let (agent_used, _) = self.store.get_quota_usage(&self.today(now))?;
        let effective_limit = self.config.daily_agent_requests.saturating_sub(self.config.reserve_requests);
        if agent_used >= effective_limit {
            *self.paused.lock() = true;
            warn!(agent_used, effective_limit, "quota exhausted");
            return Ok((false, format!("agent request quota exhausted ({agent_used}/{effective_limit})")));
        }

        let pct = (agent_used as f64 / self.config.daily_agent_requests as f64) * 100.0;
        if pct >= self.config.pause_at_percent as f64 {
            *self.paused.lock() = true;
            warn!(percent = pct, threshold = self.config.pause_at_percent, "quota threshold reached");
            return Ok((false, format!("quota at {pct:.0}% (threshold: {}%)", self.config.pause_at_percent)));
        }

        Ok((true, "ok".into()))
    }

    pub fn record_agent_request(&self, now: DateTime<Utc>, count: u32) -> orc_storage::StoreResult<()> {
        self.store.increment_quota(&self.today(now), count, 0)
    }

    pub fn record_prompt(&self, now: DateTime<Utc>, count: u32) -> orc_storage::StoreResult<()> {
        self.store.increment_quota(&self.today(now), 0, count)
    }

    pub fn agent_started(&self) {
        *self.active_agents.lock() += 1;
    }

    pub fn agent_stopped(&self) {
        let mut active = self.active_agents.lock();
        *active = active.saturating_sub(1);
    }

    pub fn resume(&self) {
        *self.paused.lock() = false;
    }

    /// Auto-resumes once the day key rolls over and nothing has been
    /// recorded against the new day yet. Returns whether it just resumed.
    pub fn check_reset(&self, now: DateTime<Utc>) -> orc_storage::StoreResult<bool> {
        let (agent_used, _) = self.store.get_quota_usage(&self.today(now))?;
        if agent_used == 0 && *self.paused.lock() {
            *self.paused.lock() = false;
            return Ok(true);
        }
        Ok(false)
    }

    fn next_reset(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let shifted = now + Duration::minutes(self.config.day_offset_minutes as i64);
        let next_midnight_shifted = shifted.date_naive().succ_opt().unwrap_or(shifted.date_naive()).and_hms_opt(0, 0, 0).unwrap_or(shifted.naive_utc());
        let next_midnight_shifted = Utc.from_utc_datetime(&next_midnight_shifted);
        next_midnight_shifted - Duration::minutes(self.config.day_offset_minutes as i64)
    }

    pub fn time_until_reset(&self, now: DateTime<Utc>) -> String {
        let remaining = self.next_reset(now) - now;
        if remaining <= Duration::zero() {
            return "resetting now".into();
        }
        format!("{}h {}m", remaining.num_hours(), remaining.num_minutes() % 60)
    }
}

#[cfg(test)]
#[path = "quota_tests.rs"]
mod tests;
