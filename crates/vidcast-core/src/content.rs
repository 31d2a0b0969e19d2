//! Videos and comments, the targets of reactions.
//!
//! Only metadata lives here; media files are handled outside the core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, CommentId, VideoId, engagement::ReactionKind};

/// Comments returned per page by
/// [`SocialStore::list_comments`](crate::store::SocialStore::list_comments).
pub const COMMENT_PAGE_SIZE: usize = 30;

/// Maximum comment length, in characters, after trimming.
pub const MAX_COMMENT_CHARS: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
  pub video_id:    VideoId,
  pub owner_id:    AccountId,
  pub title:       String,
  pub description: Option<String>,
  pub uploaded_at: DateTime<Utc>,
  pub views:       i64,
  pub likes:       i64,
  pub dislikes:    i64,
}

#[derive(Debug, Clone)]
pub struct NewVideo {
  pub owner_id:    AccountId,
  pub title:       String,
  pub description: Option<String>,
}

/// New title and description for an existing video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoChanges {
  pub title:       String,
  pub description: Option<String>,
}

impl VideoChanges {
  /// Trim both fields; the title must not be blank, a blank description
  /// clears it.
  pub fn new(title: &str, description: Option<&str>) -> crate::Result<Self> {
    let title = title.trim();
    if title.is_empty() {
      return Err(crate::Error::Invalid("title must not be empty".into()));
    }
    let description = description.map(str::trim).filter(|d| !d.is_empty()).map(str::to_owned);
    Ok(Self { title: title.to_owned(), description })
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: CommentId,
  pub video_id:   VideoId,
  pub owner_id:   AccountId,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  pub likes:      i64,
  pub dislikes:   i64,
}

#[derive(Debug, Clone)]
pub struct NewComment {
  pub video_id: VideoId,
  pub owner_id: AccountId,
  pub content:  String,
}

impl NewComment {
  /// Trim `content` and reject empty or over-long comments.
  pub fn new(
    video_id: VideoId,
    owner_id: AccountId,
    content: &str,
  ) -> crate::Result<Self> {
    let content = content.trim();
    if content.is_empty() {
      return Err(crate::Error::Invalid("comment must not be empty".into()));
    }
    if content.chars().count() > MAX_COMMENT_CHARS {
      return Err(crate::Error::Invalid(format!(
        "comment must be at most {MAX_COMMENT_CHARS} characters"
      )));
    }
    Ok(Self { video_id, owner_id, content: content.to_owned() })
  }
}

/// Sort order for comment listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentOrder {
  /// Most liked first.
  #[default]
  Likes,
  /// Newest first.
  Recent,
  /// Oldest first.
  Old,
}

/// A comment as seen by a particular viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
  #[serde(flatten)]
  pub comment:        Comment,
  pub owner_username: String,
  /// The viewer's own reaction to this comment, if any.
  pub reaction:       Option<ReactionKind>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_comment_trims_content() {
    let c = NewComment::new(VideoId(1), AccountId(2), "  hello  ").unwrap();
    assert_eq!(c.content, "hello");
  }

  #[test]
  fn new_comment_rejects_blank() {
    assert!(NewComment::new(VideoId(1), AccountId(2), "   ").is_err());
  }

  #[test]
  fn video_changes_require_a_title() {
    assert!(VideoChanges::new(" ", Some("desc")).is_err());
    let changes = VideoChanges::new(" Trailer ", Some("")).unwrap();
    assert_eq!(changes, VideoChanges { title: "Trailer".into(), description: None });
  }

  #[test]
  fn new_comment_rejects_too_long() {
    let long = "x".repeat(MAX_COMMENT_CHARS + 1);
    assert!(NewComment::new(VideoId(1), AccountId(2), &long).is_err());
    let exact = "x".repeat(MAX_COMMENT_CHARS);
    assert!(NewComment::new(VideoId(1), AccountId(2), &exact).is_ok());
  }
}
