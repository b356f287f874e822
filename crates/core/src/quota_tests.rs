// SPDX-License-Identifier: MIT

use super::*;
use chrono::Utc;

fn status(agent_used: u32, agent_limit: u32, prompt_used: u32, prompt_limit: u32) -> QuotaStatus {
    QuotaStatus {
        agent_requests_used: agent_used,
        agent_requests_limit: agent_limit,
        prompts_used: prompt_used,
        prompts_limit: prompt_limit,
        concurrent_agents: 0,
        max_concurrent: 1,
        is_paused: false,
        reset_at: Utc::now(),
    }
}

#[test]
fn pct_at_zero_usage() {
    let q = status(0, 100, 0, 500);
    assert_eq!(q.agent_pct(), 0.0);
    assert_eq!(q.prompt_pct(), 0.0);
}

#[test]
fn pct_past_limit_exceeds_one_hundred() {
    let q = status(150, 100, 600, 500);
    assert_eq!(q.agent_pct(), 150.0);
    assert_eq!(q.prompt_pct(), 120.0);
}

#[test]
fn pct_with_zero_limit_is_zero_not_nan() {
    let q = status(5, 0, 5, 0);
    assert_eq!(q.agent_pct(), 0.0);
    assert_eq!(q.prompt_pct(), 0.0);
}
