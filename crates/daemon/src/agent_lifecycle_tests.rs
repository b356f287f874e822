// SPDX-License-Identifier: MIT

use super::*;

fn lines(s: &[&str]) -> Vec<String> {
    s.iter().map(|l| l.to_string()).collect()
}

#[test]
fn flake_boundary_four_records_nine_seconds_is_flake() {
    let class = classify(&lines(&["a", "b", "c", "d"]), Duration::from_secs(9), 4, 0, 0);
    assert_eq!(class, RetryClass::Flake);
}

#[test]
fn flake_boundary_five_records_eleven_seconds_is_not_flake() {
    let class = classify(&lines(&["a", "b", "c", "d", "e"]), Duration::from_secs(11), 5, 0, 0);
    assert_eq!(class, RetryClass::Real);
}

#[test]
fn connection_reset_message_is_classified_flake() {
    let class = classify(&lines(&["something failed: connection reset by peer"]), Duration::from_secs(3), 1, 0, 0);
    assert_eq!(class, RetryClass::Flake);
}

#[test]
fn quota_exhaustion_message_takes_priority_over_flake() {
    let class = classify(&lines(&["error: rate limit exceeded, connection reset"]), Duration::from_secs(3), 1, 0, 0);
    assert_eq!(class, RetryClass::QuotaBackoff);
}

#[test]
fn flake_retries_exhausted_falls_through_to_real() {
    let class = classify(&lines(&["connection reset"]), Duration::from_secs(3), 1, 0, MAX_FLAKE_RETRIES);
    assert_eq!(class, RetryClass::Real);
}

#[test]
fn zero_records_is_always_flake_when_budget_remains() {
    let class = classify(&[], Duration::from_secs(60), 0, 0, 0);
    assert_eq!(class, RetryClass::Flake);
}

#[test]
fn ordinary_failure_with_plenty_of_output_is_real() {
    let class = classify(&lines(&["compiling...", "test failed: assertion mismatch"]), Duration::from_secs(120), 40, 0, 0);
    assert_eq!(class, RetryClass::Real);
}
