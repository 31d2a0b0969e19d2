//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that lexicographic comparison in SQL matches
//! chronological order. Ids are stored as `INTEGER`.

use chrono::{DateTime, SecondsFormat, Utc};
use vidcast_core::{
  AccountId, CommentId, FollowUpId, MessageId, VideoId,
  account::Account,
  content::{Comment, CommentOrder, CommentView, Video},
  engagement::{FollowUpRequest, ReactionKind, ReactionTarget},
  message::PrivateMessage,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── Reactions ───────────────────────────────────────────────────────────────

pub fn encode_reaction_kind(k: ReactionKind) -> &'static str {
  match k {
    ReactionKind::Like => "like",
    ReactionKind::Dislike => "dislike",
  }
}

pub fn decode_reaction_kind(s: &str) -> Result<ReactionKind> {
  match s {
    "like" => Ok(ReactionKind::Like),
    "dislike" => Ok(ReactionKind::Dislike),
    other => Err(Error::UnknownReactionKind(other.to_owned())),
  }
}

/// The counter column on the target table that tracks `k`.
pub fn counter_column(k: ReactionKind) -> &'static str {
  match k {
    ReactionKind::Like => "likes",
    ReactionKind::Dislike => "dislikes",
  }
}

/// Table and column names for a reaction target.
pub struct ReactionTables {
  /// Edge table, keyed by `(account_id, <id_column>)`.
  pub edges:     &'static str,
  /// Entity table carrying the `likes` / `dislikes` counters.
  pub entities:  &'static str,
  pub id_column: &'static str,
  pub target_id: i64,
}

pub fn reaction_tables(target: ReactionTarget) -> ReactionTables {
  match target {
    ReactionTarget::Video(VideoId(id)) => ReactionTables {
      edges:     "video_reactions",
      entities:  "videos",
      id_column: "video_id",
      target_id: id,
    },
    ReactionTarget::Comment(CommentId(id)) => ReactionTables {
      edges:     "comment_reactions",
      entities:  "comments",
      id_column: "comment_id",
      target_id: id,
    },
  }
}

// ─── CommentOrder ────────────────────────────────────────────────────────────

pub fn order_clause(order: CommentOrder) -> &'static str {
  match order {
    CommentOrder::Likes => "c.likes DESC, c.comment_id DESC",
    CommentOrder::Recent => "c.comment_id DESC",
    CommentOrder::Old => "c.comment_id ASC",
  }
}

// ─── Raw row types ───────────────────────────────────────────────────────────

pub const ACCOUNT_COLUMNS: &str = "account_id, username, email, password_hash, biography, \
   subscriber_count, is_private, is_online, last_active, created_at";

/// An `accounts` row before timestamp decoding.
pub struct RawAccount {
  pub account_id:       i64,
  pub username:         String,
  pub email:            String,
  pub password_hash:    String,
  pub biography:        Option<String>,
  pub subscriber_count: i64,
  pub is_private:       bool,
  pub is_online:        bool,
  pub last_active:      Option<String>,
  pub created_at:       String,
}

impl RawAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:       row.get(0)?,
      username:         row.get(1)?,
      email:            row.get(2)?,
      password_hash:    row.get(3)?,
      biography:        row.get(4)?,
      subscriber_count: row.get(5)?,
      is_private:       row.get(6)?,
      is_online:        row.get(7)?,
      last_active:      row.get(8)?,
      created_at:       row.get(9)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:       AccountId(self.account_id),
      username:         self.username,
      email:            self.email,
      password_hash:    self.password_hash,
      biography:        self.biography,
      subscriber_count: self.subscriber_count,
      private:          self.is_private,
      online:           self.is_online,
      last_active:      decode_opt_dt(self.last_active)?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

pub const VIDEO_COLUMNS: &str =
  "video_id, owner_id, title, description, uploaded_at, views, likes, dislikes";

pub struct RawVideo {
  pub video_id:    i64,
  pub owner_id:    i64,
  pub title:       String,
  pub description: Option<String>,
  pub uploaded_at: String,
  pub views:       i64,
  pub likes:       i64,
  pub dislikes:    i64,
}

impl RawVideo {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      video_id:    row.get(0)?,
      owner_id:    row.get(1)?,
      title:       row.get(2)?,
      description: row.get(3)?,
      uploaded_at: row.get(4)?,
      views:       row.get(5)?,
      likes:       row.get(6)?,
      dislikes:    row.get(7)?,
    })
  }

  pub fn into_video(self) -> Result<Video> {
    Ok(Video {
      video_id:    VideoId(self.video_id),
      owner_id:    AccountId(self.owner_id),
      title:       self.title,
      description: self.description,
      uploaded_at: decode_dt(&self.uploaded_at)?,
      views:       self.views,
      likes:       self.likes,
      dislikes:    self.dislikes,
    })
  }
}

pub const COMMENT_COLUMNS: &str =
  "c.comment_id, c.video_id, c.owner_id, c.content, c.created_at, c.likes, c.dislikes";

pub struct RawComment {
  pub comment_id: i64,
  pub video_id:   i64,
  pub owner_id:   i64,
  pub content:    String,
  pub created_at: String,
  pub likes:      i64,
  pub dislikes:   i64,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id: row.get(0)?,
      video_id:   row.get(1)?,
      owner_id:   row.get(2)?,
      content:    row.get(3)?,
      created_at: row.get(4)?,
      likes:      row.get(5)?,
      dislikes:   row.get(6)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: CommentId(self.comment_id),
      video_id:   VideoId(self.video_id),
      owner_id:   AccountId(self.owner_id),
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
      likes:      self.likes,
      dislikes:   self.dislikes,
    })
  }
}

/// A comment row joined with its owner's username and the viewer's reaction.
pub struct RawCommentView {
  pub comment:        RawComment,
  pub owner_username: String,
  pub reaction:       Option<String>,
}

impl RawCommentView {
  pub fn into_view(self) -> Result<CommentView> {
    Ok(CommentView {
      comment:        self.comment.into_comment()?,
      owner_username: self.owner_username,
      reaction:       self.reaction.as_deref().map(decode_reaction_kind).transpose()?,
    })
  }
}

pub const FOLLOWUP_COLUMNS: &str = "followup_id, requester_id, owner_id, created_at";

pub struct RawFollowUp {
  pub followup_id:  i64,
  pub requester_id: i64,
  pub owner_id:     i64,
  pub created_at:   String,
}

impl RawFollowUp {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      followup_id:  row.get(0)?,
      requester_id: row.get(1)?,
      owner_id:     row.get(2)?,
      created_at:   row.get(3)?,
    })
  }

  pub fn into_followup(self) -> Result<FollowUpRequest> {
    Ok(FollowUpRequest {
      followup_id:  FollowUpId(self.followup_id),
      requester_id: AccountId(self.requester_id),
      owner_id:     AccountId(self.owner_id),
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub const MESSAGE_COLUMNS: &str = "message_id, sender_id, recipient_id, content, sent_at";

pub struct RawMessage {
  pub message_id:   i64,
  pub sender_id:    i64,
  pub recipient_id: i64,
  pub content:      String,
  pub sent_at:      String,
}

impl RawMessage {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      message_id:   row.get(0)?,
      sender_id:    row.get(1)?,
      recipient_id: row.get(2)?,
      content:      row.get(3)?,
      sent_at:      row.get(4)?,
    })
  }

  pub fn into_message(self) -> Result<PrivateMessage> {
    Ok(PrivateMessage {
      message_id:   MessageId(self.message_id),
      sender_id:    AccountId(self.sender_id),
      recipient_id: AccountId(self.recipient_id),
      content:      self.content,
      sent_at:      decode_dt(&self.sent_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexicographically() {
    let early = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let late = early + chrono::Duration::milliseconds(1500);
    assert!(encode_dt(early) < encode_dt(late));
    assert_eq!(decode_dt(&encode_dt(late)).unwrap(), late);
  }

  #[test]
  fn unknown_reaction_kind_is_an_error() {
    assert!(matches!(
      decode_reaction_kind("meh"),
      Err(Error::UnknownReactionKind(_))
    ));
  }
}
