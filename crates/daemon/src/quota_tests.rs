// SPDX-License-Identifier: MIT

use super::*;
use chrono::TimeZone;

fn manager() -> QuotaManager {
    QuotaManager::new(QuotaConfig::default(), orc_storage::Store::open_in_memory().unwrap())
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

#[test]
fn can_start_agent_when_fresh() {
    let qm = manager();
    let (ok, _) = qm.can_start_agent(at(2026, 8, 1, 12)).unwrap();
    assert!(ok);
}

#[test]
fn pauses_once_effective_limit_reached() {
    let qm = manager();
    let now = at(2026, 8, 1, 12);
    qm.record_agent_request(now, 180).unwrap(); // limit 200 - reserve 20 = 180
    let (ok, reason) = qm.can_start_agent(now).unwrap();
    assert!(!ok);
    assert!(reason.contains("exhausted"));
}

#[test]
fn max_concurrent_blocks_independent_of_usage() {
    let qm = manager();
    qm.agent_started();
    qm.agent_started();
    qm.agent_started();
    let (ok, reason) = qm.can_start_agent(at(2026, 8, 1, 12)).unwrap();
    assert!(!ok);
    assert!(reason.contains("concurrent"));
}

#[test]
fn agent_stopped_never_underflows_below_zero() {
    let qm = manager();
    qm.agent_stopped();
    assert_eq!(*qm.active_agents.lock(), 0);
}

#[test]
fn check_reset_resumes_once_day_key_rolls_with_no_usage() {
    let qm = manager();
    *qm.paused.lock() = true;
    let resumed = qm.check_reset(at(2026, 8, 2, 0)).unwrap();
    assert!(resumed);
    assert!(!*qm.paused.lock());
}

#[test]
fn day_key_uses_configured_offset_not_utc_midnight() {
    let qm = manager();
    // 06:00 UTC with a -480 minute (UTC-8) offset is still "yesterday" there.
    let late_utc = at(2026, 8, 2, 6);
    let early_utc = at(2026, 8, 1, 23);
    assert_eq!(qm.today(late_utc), "2026-08-01");
    assert_eq!(qm.today(early_utc), "2026-08-01");
}

#[test]
fn time_until_reset_is_not_resetting_well_before_midnight() {
    let qm = manager();
    let msg = qm.time_until_reset(at(2026, 8, 1, 12));
    assert_ne!(msg, "resetting now");
}
