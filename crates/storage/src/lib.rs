// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Embedded relational persistence for the orchestrator: a single sqlite
//! connection behind a mutex, opened in WAL mode with foreign keys enforced,
//! plus the crash-recovery sweep run once at startup.

mod agents;
mod chat;
mod error;
mod pipelines;
mod pr_lifecycles;
mod quota;
mod recovery;
mod schema;
mod tasks;

pub use error::{StoreError, StoreResult};
pub use recovery::RecoveryReport;

use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// A single sqlite connection shared by every storage operation. Writes and
/// point reads alike take the mutex: sqlite's WAL mode buys readers snapshot
/// isolation, but this workspace keeps a single writer for simplicity.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::migrate(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::migrate(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;

    #[test]
    fn open_in_memory_runs_migrations_idempotently() {
        let store = Store::open_in_memory().unwrap();
        // a second migration pass over the same connection must be a no-op
        schema::migrate(&store.conn.lock()).unwrap();
    }
}
