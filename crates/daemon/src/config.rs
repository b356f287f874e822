// SPDX-License-Identifier: MIT

//! Orchestrator configuration. Parsing a config *file* is out of scope here
//! — callers build this struct (from YAML, env vars, whatever) and hand it
//! to [`crate::Daemon::new`]; only resolution of the handful of daemon paths
//! that have environment overrides lives in [`crate::env`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailConfig {
    pub protected_branches: Vec<String>,
    pub blocked_paths: Vec<String>,
    pub max_files_changed: u64,
    pub max_lines_changed: u64,
    pub task_timeout_minutes: u64,
    pub max_retries: u32,
    pub block_force_push: bool,
    pub auto_rollback_on_failure: bool,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            protected_branches: vec!["main".into(), "master".into(), "release/*".into()],
            blocked_paths: vec![
                "~/.ssh".into(),
                "~/.conductor".into(),
                "~/.env".into(),
                "~/.gitconfig".into(),
            ],
            max_files_changed: 50,
            max_lines_changed: 2000,
            task_timeout_minutes: 30,
            max_retries: 2,
            block_force_push: true,
            auto_rollback_on_failure: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    pub daily_agent_requests: u32,
    pub daily_prompts: u32,
    pub max_concurrent: u32,
    pub pause_at_percent: u32,
    pub reserve_requests: u32,
    /// Fixed offset applied to `Utc::now()` before deriving the day key, in
    /// minutes. Default -480 (UTC-8) approximates the upstream quota
    /// provider's reset boundary; not DST-aware.
    pub day_offset_minutes: i32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_agent_requests: 200,
            daily_prompts: 1500,
            max_concurrent: 3,
            pause_at_percent: 90,
            reserve_requests: 20,
            day_offset_minutes: -480,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_path: String,
    pub workspace_pattern: String,
    pub agent_binary: String,
    pub credential_env_key: String,
    pub guardrails: GuardrailConfig,
    pub quota: QuotaConfig,
    pub main_tick_seconds: u64,
    pub diff_stats_tick_seconds: u64,
    pub pr_lifecycle_tick_seconds: u64,
    pub git_timeout_seconds: u64,
    pub max_pr_iterations: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "orchestrator.db".into(),
            workspace_pattern: "workspaces/*".into(),
            agent_binary: "agent".into(),
            credential_env_key: "ORC_AGENT_TOKEN".into(),
            guardrails: GuardrailConfig::default(),
            quota: QuotaConfig::default(),
            main_tick_seconds: 5,
            diff_stats_tick_seconds: 8,
            pr_lifecycle_tick_seconds: 10,
            git_timeout_seconds: 30,
            max_pr_iterations: 3,
        }
    }
}
