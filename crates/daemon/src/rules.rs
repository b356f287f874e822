// SPDX-License-Identifier: MIT

//! Matches events against user-authored [`orc_core::Rule`]s and produces
//! `{key}`-interpolated task-creation actions. The rule *schema* (how rules
//! are authored, e.g. as YAML on disk) is out of scope; this is only the
//! evaluator.

use orc_core::{Event, Rule, TaskPriority};
use regex::RegexBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleAction {
    pub title: String,
    pub priority: TaskPriority,
    pub action_type: String,
}

pub struct RulesEngine {
    rules: Vec<Rule>,
}

impl RulesEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn evaluate(&self, event: &Event) -> Vec<RuleAction> {
        let kind = event.kind();
        let source = event_source(event);
        let serialized = serde_json::to_string(event).unwrap_or_default();

        self.rules
            .iter()
            .filter(|rule| rule.enabled)
            .filter(|rule| rule.trigger_type.is_empty() || rule.trigger_type == kind)
            .filter(|rule| rule.trigger_source.is_empty() || rule.trigger_source.eq_ignore_ascii_case(&source))
            .filter(|rule| match rule.trigger_pattern.is_empty() {
                true => true,
                false => RegexBuilder::new(&rule.trigger_pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| re.is_match(&serialized))
                    .unwrap_or(false),
            })
            .map(|rule| RuleAction {
                title: interpolate(&rule.action_template, event),
                priority: rule.action_priority,
                action_type: rule.action_type.clone(),
            })
            .collect()
    }
}

fn event_source(event: &Event) -> String {
    match event {
        Event::GithubEvent { kind, .. } => kind.clone(),
        Event::RuleTriggered { rule_name, .. } => rule_name.clone(),
        _ => String::new(),
    }
}

/// Replaces `{kind}` with the event's type and `{source}` with its source
/// field; any other `{...}` placeholder is left untouched (the action
/// template's schema is out of scope here).
fn interpolate(template: &str, event: &Event) -> String {
    template.replace("{kind}", event.kind()).replace("{source}", &event_source(event))
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
