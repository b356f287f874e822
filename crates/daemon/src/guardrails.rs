// SPDX-License-Identifier: MIT

//! Filesystem sandbox, git safety, and resource-limit policing for a
//! supervised agent run.

use regex::RegexSet;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

use crate::config::GuardrailConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: &'static str,
    pub severity: &'static str,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutputCheck {
    pub violations: Vec<Violation>,
    pub should_kill: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffSizeCheck {
    pub files_ok: bool,
    pub lines_ok: bool,
    pub ok: bool,
}

pub struct Guardrails {
    config: GuardrailConfig,
    force_push_patterns: RegexSet,
    dangerous_patterns: Vec<(&'static str, regex::Regex)>,
}

const DANGEROUS: &[(&str, &str)] = &[
    ("recursive_delete_root", r"rm\s+-rf\s+/"),
    ("recursive_delete_home", r"rm\s+-rf\s+~/"),
    ("insecure_permissions", r"chmod\s+-R\s+777"),
    ("pipe_to_shell", r"curl\s+.*\|\s*sh"),
    ("pipe_to_shell", r"wget\s+.*\|\s*sh"),
];

impl Guardrails {
    pub fn new(config: GuardrailConfig) -> Self {
        let force_push_patterns = RegexSet::new([
            r"(?i)git\s+push\s+.*--force",
            r"(?i)git\s+push\s+-f\b",
            r"(?i)git\s+push\s+.*--force-with-lease",
        ])
        .expect("static force-push pattern set must compile");
        let dangerous_patterns = DANGEROUS
            .iter()
            .map(|(kind, pattern)| {
                (*kind, regex::Regex::new(&format!("(?i){pattern}")).expect("static pattern must compile"))
            })
            .collect();
        Self { config, force_push_patterns, dangerous_patterns }
    }

    pub fn check_branch_allowed(&self, branch: &str) -> bool {
        for pattern in &self.config.protected_branches {
            let blocked = match pattern.strip_suffix("/*") {
                Some(prefix) => branch.starts_with(prefix),
                None => branch == pattern,
            };
            if blocked {
                warn!(branch, pattern, "branch blocked by guardrails");
                return false;
            }
        }
        true
    }

    pub fn check_path_allowed(&self, path: &Path) -> bool {
        let resolved = normalize(&expand_home(path));
        for blocked in &self.config.blocked_paths {
            let blocked_resolved = normalize(&expand_home(Path::new(blocked)));
            if resolved.starts_with(&blocked_resolved) {
                warn!(path = %resolved.display(), blocked = %blocked, "path blocked by guardrails");
                return false;
            }
        }
        true
    }

    pub fn check_workspace_scope(&self, path: &Path, workspace_path: &Path) -> bool {
        let resolved = normalize(&expand_home(path));
        let resolved_workspace = normalize(&expand_home(workspace_path));
        let in_scope = resolved.starts_with(&resolved_workspace);
        if !in_scope {
            warn!(path = %resolved.display(), workspace = %resolved_workspace.display(), "path out of workspace scope");
        }
        in_scope
    }

    /// Scan one line of agent stdout for a real shell command, then check it
    /// for force-push and other destructive patterns. Model "thinking" text
    /// that merely mentions a dangerous command is not a command execution
    /// and is not scanned.
    pub fn check_agent_output(&self, output_line: &str) -> AgentOutputCheck {
        let text_to_scan = extract_command_text(output_line);
        let Some(text) = text_to_scan else {
            return AgentOutputCheck { violations: Vec::new(), should_kill: false };
        };

        let mut violations = Vec::new();
        if self.config.block_force_push && self.force_push_patterns.is_match(&text) {
            violations.push(Violation { kind: "force_push_attempt", severity: "critical", line: truncate(&text) });
        }
        for (kind, pattern) in &self.dangerous_patterns {
            if pattern.is_match(&text) {
                violations.push(Violation { kind, severity: "critical", line: truncate(&text) });
            }
        }
        let should_kill = !violations.is_empty();
        AgentOutputCheck { violations, should_kill }
    }

    pub fn check_diff_size(&self, files_changed: u64, lines_changed: u64) -> DiffSizeCheck {
        let files_ok = files_changed <= self.config.max_files_changed;
        let lines_ok = lines_changed <= self.config.max_lines_changed;
        if !files_ok {
            warn!(files_changed, limit = self.config.max_files_changed, "diff file count exceeded");
        }
        if !lines_ok {
            warn!(lines_changed, limit = self.config.max_lines_changed, "diff line count exceeded");
        }
        DiffSizeCheck { files_ok, lines_ok, ok: files_ok && lines_ok }
    }

    pub fn check_timeout(&self, elapsed: std::time::Duration) -> bool {
        let limit = std::time::Duration::from_secs(self.config.task_timeout_minutes * 60);
        let within = elapsed <= limit;
        if !within {
            warn!(elapsed_s = elapsed.as_secs(), limit_s = limit.as_secs(), "task timeout exceeded");
        }
        within
    }

    pub fn generate_preamble(&self, workspace_path: &Path, task_id: i64) -> String {
        format!(
            "IMPORTANT SAFETY RULES — You MUST follow these:\n\
             1. Only modify files within: {}\n\
             2. Do NOT access: {}\n\
             3. Do NOT push to protected branches: {}\n\
             4. Do NOT use git push --force or git push -f\n\
             5. Tag all commits with: [orc:task-{task_id}]\n\
             6. Do NOT delete files outside the project directory\n\
             7. Do NOT run commands that modify system configuration\n",
            workspace_path.display(),
            self.config.blocked_paths.join(", "),
            self.config.protected_branches.join(", "),
        )
    }
}

fn expand_home(path: &Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME") {
            return std::path::PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}

/// Resolves `.`/`..` components lexically, without touching the filesystem,
/// so a not-yet-existing path can still be tested for scope containment. A
/// leading `..` that would escape an absolute path's root is dropped rather
/// than allowed to climb past it.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                match out.components().next_back() {
                    Some(Component::Normal(_)) => {
                        out.pop();
                    }
                    Some(Component::RootDir) | None => {}
                    _ => out.push(component),
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn truncate(s: &str) -> String {
    s.chars().take(200).collect()
}

/// Only scan actual command execution: JSON tool-call payloads naming a
/// shell-like tool, or plain-text lines that look like a typed command.
fn extract_command_text(output_line: &str) -> Option<String> {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(output_line) {
        let tool_name = map.get("tool").or_else(|| map.get("name")).and_then(|v| v.as_str()).unwrap_or("");
        let looks_like_shell = ["shell", "terminal", "exec", "command", "bash", "run_command"]
            .iter()
            .any(|needle| tool_name.to_lowercase().contains(needle));
        if looks_like_shell {
            let input = map.get("input").or_else(|| map.get("args"));
            return input.map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        }
        return None;
    }
    let trimmed = output_line.trim();
    if trimmed.starts_with('$') || trimmed.starts_with('>') {
        return Some(trimmed.to_string());
    }
    None
}

#[cfg(test)]
#[path = "guardrails_tests.rs"]
mod tests;
