//! Chat messages — the advisor conversation log.
//!
//! Append-only: messages are never mutated or deleted, and per-user ordering
//! is insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RecordId;

/// A single advisor-conversation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
  pub id:       RecordId,
  pub owner_id: RecordId,
  pub content:  String,
  /// `true` for the user's own messages, `false` for AI replies.
  pub from_user: bool,
  #[serde(default)]
  pub metadata: Value,
  pub created_at: DateTime<Utc>,
}

/// Input for [`crate::store::FinanceStore::append_chat_message`].
#[derive(Debug, Clone)]
pub struct NewChatMessage {
  pub owner_id:  RecordId,
  pub content:   String,
  pub from_user: bool,
  pub metadata:  Value,
}

impl NewChatMessage {
  pub fn user(owner_id: RecordId, content: impl Into<String>) -> Self {
    Self {
      owner_id,
      content: content.into(),
      from_user: true,
      metadata: Value::Null,
    }
  }

  pub fn ai(owner_id: RecordId, content: impl Into<String>) -> Self {
    Self {
      owner_id,
      content: content.into(),
      from_user: false,
      metadata: Value::Null,
    }
  }
}
