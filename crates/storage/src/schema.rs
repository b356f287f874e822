// SPDX-License-Identifier: MIT

use rusqlite::Connection;

use crate::StoreResult;

pub(crate) fn migrate(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL,
            priority TEXT NOT NULL,
            branch TEXT NOT NULL DEFAULT '',
            workspace TEXT,
            depends_on TEXT NOT NULL DEFAULT '[]',
            block_reason TEXT,
            retry_count INTEGER NOT NULL DEFAULT 0,
            max_retries INTEGER NOT NULL DEFAULT 2,
            pr_lifecycle_id INTEGER,
            pipeline_id INTEGER,
            pipeline_step INTEGER NOT NULL DEFAULT 0,
            pr_number INTEGER,
            created_at TEXT NOT NULL,
            started_at TEXT,
            completed_at TEXT,
            retry_not_before TEXT,
            metadata TEXT NOT NULL DEFAULT '{}'
        );
        CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
        CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority);

        CREATE TABLE IF NOT EXISTS agents (
            id TEXT PRIMARY KEY,
            task_id INTEGER NOT NULL,
            workspace TEXT NOT NULL,
            pid INTEGER,
            status TEXT NOT NULL,
            started_at TEXT NOT NULL,
            completed_at TEXT,
            request_count INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_agents_status ON agents(status);

        CREATE TABLE IF NOT EXISTS pipelines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            status TEXT NOT NULL,
            current_step INTEGER NOT NULL DEFAULT 0,
            total_steps INTEGER NOT NULL DEFAULT 0,
            task_ids TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pr_lifecycles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pr_number INTEGER,
            branch TEXT NOT NULL,
            title TEXT NOT NULL,
            stage TEXT NOT NULL,
            iteration INTEGER NOT NULL DEFAULT 0,
            max_iterations INTEGER NOT NULL DEFAULT 3,
            ci_fix_count INTEGER NOT NULL DEFAULT 0,
            precheck_retry_count INTEGER NOT NULL DEFAULT 0,
            greptile_comments_total INTEGER NOT NULL DEFAULT 0,
            greptile_comments_resolved INTEGER NOT NULL DEFAULT 0,
            pipeline_id INTEGER,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS quota_usage (
            day TEXT PRIMARY KEY,
            agent_requests INTEGER NOT NULL DEFAULT 0,
            prompts INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS chat_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id TEXT NOT NULL,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_chat_messages_conversation ON chat_messages(conversation_id);
        ",
    )?;
    Ok(())
}
