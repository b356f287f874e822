// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn default_rule_is_enabled_with_normal_priority() {
    let rule = Rule::default();
    assert!(rule.enabled);
    assert_eq!(rule.action_priority, TaskPriority::Normal);
    assert!(rule.name.is_empty());
}
