// SPDX-License-Identifier: MIT

//! Rule entity: a trigger/action pair the rules engine matches against
//! events. Rules are authored as YAML on disk; this crate only defines the
//! matched-in-memory shape.

use serde::{Deserialize, Serialize};

use crate::task::TaskPriority;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub trigger_type: String,
    pub trigger_pattern: String,
    pub trigger_source: String,
    pub action_type: String,
    pub action_template: String,
    pub action_priority: TaskPriority,
    pub enabled: bool,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            name: String::new(),
            trigger_type: String::new(),
            trigger_pattern: String::new(),
            trigger_source: String::new(),
            action_type: String::new(),
            action_template: String::new(),
            action_priority: TaskPriority::Normal,
            enabled: true,
        }
    }
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
