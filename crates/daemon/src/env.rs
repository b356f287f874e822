// SPDX-License-Identifier: MIT

//! Centralizes the handful of environment-variable overrides the daemon
//! recognizes for values that are otherwise fixed at config-construction
//! time: the sqlite path and the workspace glob pattern, both useful to flip
//! per-invocation without editing a config file (tests, ad hoc runs).

use std::env;

pub fn database_path_override() -> Option<String> {
    env::var("ORC_DATABASE_PATH").ok().filter(|s| !s.is_empty())
}

pub fn workspace_pattern_override() -> Option<String> {
    env::var("ORC_WORKSPACE_PATTERN").ok().filter(|s| !s.is_empty())
}

pub fn apply(config: &mut crate::config::Config) {
    if let Some(path) = database_path_override() {
        config.database_path = path;
    }
    if let Some(pattern) = workspace_pattern_override() {
        config.workspace_pattern = pattern;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn apply_overrides_database_path_from_env() {
        std::env::set_var("ORC_DATABASE_PATH", "/tmp/custom.db");
        let mut config = crate::config::Config::default();
        apply(&mut config);
        assert_eq!(config.database_path, "/tmp/custom.db");
        std::env::remove_var("ORC_DATABASE_PATH");
    }

    #[test]
    #[serial]
    fn apply_leaves_default_when_env_unset() {
        std::env::remove_var("ORC_WORKSPACE_PATTERN");
        let mut config = crate::config::Config::default();
        let before = config.workspace_pattern.clone();
        apply(&mut config);
        assert_eq!(config.workspace_pattern, before);
    }
}
