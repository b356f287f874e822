// SPDX-License-Identifier: MIT

use orc_core::{ChatMessage, ChatRole};
use rusqlite::{params, Row};

use crate::{Store, StoreError, StoreResult};

fn parse_role(s: &str) -> StoreResult<ChatRole> {
    Ok(match s {
        "user" => ChatRole::User,
        "assistant" => ChatRole::Assistant,
        "system" => ChatRole::System,
        other => return Err(StoreError::Sqlite(rusqlite::Error::InvalidColumnType(
            0,
            format!("unknown chat role {other}"),
            rusqlite::types::Type::Text,
        ))),
    })
}

impl Store {
    pub fn append_chat_message(&self, message: &ChatMessage) -> StoreResult<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO chat_messages (conversation_id, role, content, created_at)
             VALUES (?1,?2,?3,?4)",
            params![message.conversation_id, message.role.to_string(), message.content, message.created_at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_chat_messages(&self, conversation_id: &str) -> StoreResult<Vec<ChatMessage>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT * FROM chat_messages WHERE conversation_id = ?1 ORDER BY id",
        )?;
        let mut rows = stmt.query(params![conversation_id])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(hydrate_message(row)?);
        }
        Ok(out)
    }
}

fn hydrate_message(row: &Row) -> StoreResult<ChatMessage> {
    let role: String = row.get("role")?;
    Ok(ChatMessage {
        id: row.get("id")?,
        conversation_id: row.get("conversation_id")?,
        role: parse_role(&role)?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
