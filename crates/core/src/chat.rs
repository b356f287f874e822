// SPDX-License-Identifier: MIT

//! Chat message entity: append-only conversation log consumed by the
//! planning chat (out of scope) and written to by the agent lifecycle as a
//! postmortem sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

crate::simple_display! {
    ChatRole {
        User => "user",
        Assistant => "assistant",
        System => "system",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub conversation_id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
