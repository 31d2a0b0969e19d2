//! [`SqliteStore`]: the SQLite implementation of [`SocialStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, params};

use vidcast_core::{
  AccountId, CommentId, FollowUpId, VideoId,
  account::{Account, NewAccount, ProfileChanges, ProfileUpdate},
  content::{
    COMMENT_PAGE_SIZE, Comment, CommentOrder, CommentView, NewComment, NewVideo,
    Video, VideoChanges,
  },
  engagement::{
    FollowUpRequest, ReactionKind, ReactionTarget, SubscriptionOutcome,
    ToggleState,
  },
  message::{MESSAGE_PAGE_SIZE, PrivateMessage},
  store::SocialStore,
};

use crate::{
  Result,
  encode::{
    ACCOUNT_COLUMNS, COMMENT_COLUMNS, FOLLOWUP_COLUMNS, MESSAGE_COLUMNS,
    RawAccount, RawComment, RawCommentView, RawFollowUp, RawMessage, RawVideo,
    VIDEO_COLUMNS, decode_reaction_kind, encode_dt, order_clause,
    reaction_tables,
  },
  schema::SCHEMA,
  toggle,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Vidcast store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn account_where(
    &self,
    column: &'static str,
    value: rusqlite::types::Value,
  ) -> Result<Option<Account>> {
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = ?1"),
              params![value],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Run raw SQL against the store's connection.
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SocialStore impl ────────────────────────────────────────────────────────

impl SocialStore for SqliteStore {
  type Error = crate::Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_account(&self, input: NewAccount) -> Result<Option<Account>> {
    let at_str = encode_dt(Utc::now());

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM accounts WHERE username = ?1 OR email = ?2",
            params![input.username, input.email],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(None);
        }
        tx.execute(
          "INSERT INTO accounts (username, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![input.username, input.email, input.password_hash, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some(id))
      })
      .await?;

    match id {
      Some(id) => self.get_account(AccountId(id)).await,
      None => Ok(None),
    }
  }

  async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
    self.account_where("account_id", id.0.into()).await
  }

  async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
    self.account_where("username", username.to_owned().into()).await
  }

  async fn set_private(&self, id: AccountId, private: bool) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts SET is_private = ?1 WHERE account_id = ?2",
          params![private, id.0],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn update_profile(
    &self,
    id:      AccountId,
    changes: ProfileChanges,
  ) -> Result<Option<ProfileUpdate>> {
    // None: no such account. Some(false): username held by someone else.
    let updated: Option<bool> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM accounts WHERE account_id = ?1",
            params![id.0],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }
        let taken = tx
          .query_row(
            "SELECT 1 FROM accounts WHERE username = ?1 AND account_id != ?2",
            params![changes.username, id.0],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(Some(false));
        }
        tx.execute(
          "UPDATE accounts SET username = ?1, biography = ?2 WHERE account_id = ?3",
          params![changes.username, changes.biography, id.0],
        )?;
        tx.commit()?;
        Ok(Some(true))
      })
      .await?;

    match updated {
      None => Ok(None),
      Some(false) => Ok(Some(ProfileUpdate::UsernameTaken)),
      Some(true) => Ok(self.get_account(id).await?.map(ProfileUpdate::Updated)),
    }
  }

  async fn set_presence(&self, id: AccountId, online: bool, at: DateTime<Utc>) -> Result<()> {
    let at_str = encode_dt(at);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE accounts SET is_online = ?1, last_active = ?2 WHERE account_id = ?3",
          params![online, at_str, id.0],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(
    &self,
    account:    AccountId,
    token_hash: String,
    expires_at: DateTime<Utc>,
  ) -> Result<()> {
    let expires_str = encode_dt(expires_at);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, account_id, expires_at) VALUES (?1, ?2, ?3)",
          params![token_hash, account.0, expires_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn session_account(
    &self,
    token_hash: String,
    now:        DateTime<Utc>,
  ) -> Result<Option<AccountId>> {
    let now_str = encode_dt(now);
    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT account_id FROM sessions WHERE token_hash = ?1 AND expires_at > ?2",
              params![token_hash, now_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(id.map(AccountId))
  }

  async fn delete_session(&self, token_hash: String) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM sessions WHERE token_hash = ?1", params![token_hash])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  async fn is_subscribed(&self, subscriber: AccountId, channel: AccountId) -> Result<bool> {
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM subscriptions WHERE subscriber_id = ?1 AND channel_id = ?2",
              params![subscriber.0, channel.0],
              |_| Ok(()),
            )
            .optional()?
            .is_some(),
        )
      })
      .await?;
    Ok(found)
  }

  async fn subscriptions_of(&self, subscriber: AccountId) -> Result<Vec<AccountId>> {
    let ids: Vec<i64> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT channel_id FROM subscriptions WHERE subscriber_id = ?1 ORDER BY channel_id",
        )?;
        let rows = stmt
          .query_map(params![subscriber.0], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(ids.into_iter().map(AccountId).collect())
  }

  async fn toggle_subscription(
    &self,
    actor:   AccountId,
    channel: AccountId,
  ) -> Result<Option<SubscriptionOutcome>> {
    let now_str = encode_dt(Utc::now());
    let outcome = self
      .conn
      .call(move |conn| Ok(toggle::toggle_subscription(conn, actor.0, channel.0, &now_str)?))
      .await?;
    Ok(outcome)
  }

  async fn repair_counters(&self) -> Result<u64> {
    let repaired = self
      .conn
      .call(|conn| Ok(toggle::repair_counters(conn)?))
      .await?;
    if repaired > 0 {
      tracing::warn!(repaired, "corrected drifted engagement counters");
    }
    Ok(repaired)
  }

  // ── Follow-up requests ────────────────────────────────────────────────────

  async fn get_followup(&self, id: FollowUpId) -> Result<Option<FollowUpRequest>> {
    let raw: Option<RawFollowUp> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {FOLLOWUP_COLUMNS} FROM follow_ups WHERE followup_id = ?1"),
              params![id.0],
              RawFollowUp::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawFollowUp::into_followup).transpose()
  }

  async fn pending_followups(&self, owner: AccountId) -> Result<Vec<FollowUpRequest>> {
    let raws: Vec<RawFollowUp> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FOLLOWUP_COLUMNS} FROM follow_ups
           WHERE owner_id = ?1 ORDER BY followup_id"
        ))?;
        let rows = stmt
          .query_map(params![owner.0], RawFollowUp::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawFollowUp::into_followup).collect()
  }

  async fn accept_followup(
    &self,
    id:    FollowUpId,
    owner: AccountId,
  ) -> Result<Option<FollowUpRequest>> {
    let now_str = encode_dt(Utc::now());
    let raw = self
      .conn
      .call(move |conn| Ok(toggle::accept_followup(conn, id.0, owner.0, &now_str)?))
      .await?;
    raw.map(RawFollowUp::into_followup).transpose()
  }

  async fn deny_followup(&self, id: FollowUpId, owner: AccountId) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM follow_ups WHERE followup_id = ?1 AND owner_id = ?2",
          params![id.0, owner.0],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  // ── Content ───────────────────────────────────────────────────────────────

  async fn create_video(&self, input: NewVideo) -> Result<Video> {
    let uploaded_at = Utc::now();
    let at_str      = encode_dt(uploaded_at);
    let title       = input.title.clone();
    let description = input.description.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO videos (owner_id, title, description, uploaded_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![input.owner_id.0, title, description, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Video {
      video_id: VideoId(id),
      owner_id: input.owner_id,
      title: input.title,
      description: input.description,
      uploaded_at,
      views: 0,
      likes: 0,
      dislikes: 0,
    })
  }

  async fn get_video(&self, id: VideoId) -> Result<Option<Video>> {
    let raw: Option<RawVideo> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE video_id = ?1"),
              params![id.0],
              RawVideo::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawVideo::into_video).transpose()
  }

  async fn videos_of(&self, owner: AccountId) -> Result<Vec<Video>> {
    let raws: Vec<RawVideo> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VIDEO_COLUMNS} FROM videos WHERE owner_id = ?1 ORDER BY video_id DESC"
        ))?;
        let rows = stmt
          .query_map(params![owner.0], RawVideo::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawVideo::into_video).collect()
  }

  async fn edit_video(
    &self,
    id:      VideoId,
    owner:   AccountId,
    changes: VideoChanges,
  ) -> Result<Option<Video>> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE videos SET title = ?1, description = ?2
           WHERE video_id = ?3 AND owner_id = ?4",
          params![changes.title, changes.description, id.0, owner.0],
        )?)
      })
      .await?;
    if changed == 0 {
      return Ok(None);
    }
    self.get_video(id).await
  }

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let content    = input.content.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (video_id, owner_id, content, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![input.video_id.0, input.owner_id.0, content, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Comment {
      comment_id: CommentId(id),
      video_id: input.video_id,
      owner_id: input.owner_id,
      content: input.content,
      created_at,
      likes: 0,
      dislikes: 0,
    })
  }

  async fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.comment_id = ?1"),
              params![id.0],
              RawComment::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawComment::into_comment).transpose()
  }

  async fn list_comments(
    &self,
    video:  VideoId,
    viewer: AccountId,
    order:  CommentOrder,
    offset: usize,
  ) -> Result<Vec<CommentView>> {
    let order_by   = order_clause(order);
    let limit_val  = COMMENT_PAGE_SIZE as i64;
    let offset_val = offset as i64;

    let raws: Vec<RawCommentView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS}, a.username, r.kind
           FROM comments c
           JOIN accounts a ON a.account_id = c.owner_id
           LEFT JOIN comment_reactions r
             ON r.comment_id = c.comment_id AND r.account_id = ?2
           WHERE c.video_id = ?1
           ORDER BY {order_by}
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(
            params![video.0, viewer.0, limit_val, offset_val],
            |row| {
              Ok(RawCommentView {
                comment:        RawComment::from_row(row)?,
                owner_username: row.get(7)?,
                reaction:       row.get(8)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCommentView::into_view).collect()
  }

  // ── Reactions ─────────────────────────────────────────────────────────────

  async fn toggle_reaction(
    &self,
    actor:  AccountId,
    target: ReactionTarget,
    kind:   ReactionKind,
  ) -> Result<Option<ToggleState>> {
    let state = self
      .conn
      .call(move |conn| Ok(toggle::toggle_reaction(conn, actor.0, target, kind)?))
      .await?;
    Ok(state)
  }

  async fn reaction_of(
    &self,
    actor:  AccountId,
    target: ReactionTarget,
  ) -> Result<Option<ReactionKind>> {
    let t = reaction_tables(target);
    let kind: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT kind FROM {} WHERE account_id = ?1 AND {} = ?2",
                t.edges, t.id_column
              ),
              params![actor.0, t.target_id],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    kind.as_deref().map(decode_reaction_kind).transpose()
  }

  // ── Private messages ──────────────────────────────────────────────────────

  async fn send_message(
    &self,
    sender:    AccountId,
    recipient: AccountId,
    content:   String,
  ) -> Result<PrivateMessage> {
    let sent_at = Utc::now();
    let at_str  = encode_dt(sent_at);
    let body    = content.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO private_messages (sender_id, recipient_id, content, sent_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![sender.0, recipient.0, body, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(PrivateMessage {
      message_id: vidcast_core::MessageId(id),
      sender_id: sender,
      recipient_id: recipient,
      content,
      sent_at,
    })
  }

  async fn conversation(
    &self,
    a:      AccountId,
    b:      AccountId,
    offset: usize,
  ) -> Result<Vec<PrivateMessage>> {
    let limit_val  = MESSAGE_PAGE_SIZE as i64;
    let offset_val = offset as i64;

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MESSAGE_COLUMNS} FROM private_messages
           WHERE (sender_id = ?1 AND recipient_id = ?2)
              OR (sender_id = ?2 AND recipient_id = ?1)
           ORDER BY message_id DESC
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(params![a.0, b.0, limit_val, offset_val], RawMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }
}
