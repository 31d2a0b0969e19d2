//! Private messages and the JSON frames pushed to realtime clients.
//!
//! [`PresenceUpdate`] and [`ChatDelivery`] are the exact shapes clients
//! parse; field names and types must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, MessageId, Result};

/// Messages returned per page by
/// [`SocialStore::conversation`](crate::store::SocialStore::conversation).
pub const MESSAGE_PAGE_SIZE: usize = 30;

/// Human-readable timestamp format used in chat frames.
const CHAT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateMessage {
  pub message_id:   MessageId,
  pub sender_id:    AccountId,
  pub recipient_id: AccountId,
  pub content:      String,
  pub sent_at:      DateTime<Utc>,
}

// ─── Wire frames ─────────────────────────────────────────────────────────────

/// Presence delta: `{"user_id": <int>, "status": <bool>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceUpdate {
  pub user_id: AccountId,
  /// `true` for online, `false` for offline.
  pub status:  bool,
}

impl PresenceUpdate {
  pub fn online(user_id: AccountId) -> Self { Self { user_id, status: true } }

  pub fn offline(user_id: AccountId) -> Self { Self { user_id, status: false } }

  pub fn to_text(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }
}

/// Chat delivery: `{"content": <str>, "author": <int>, "date": <str>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDelivery {
  pub content: String,
  pub author:  AccountId,
  pub date:    String,
}

impl ChatDelivery {
  pub fn to_text(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }
}

impl From<&PrivateMessage> for ChatDelivery {
  fn from(message: &PrivateMessage) -> Self {
    Self {
      content: message.content.clone(),
      author:  message.sender_id,
      date:    message.sent_at.format(CHAT_DATE_FORMAT).to_string(),
    }
  }
}
