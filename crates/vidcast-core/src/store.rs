//! The `SocialStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `vidcast-store-sqlite`).
//! Higher layers (`vidcast-realtime`, `vidcast-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  AccountId, CommentId, FollowUpId, VideoId,
  account::{Account, NewAccount, ProfileChanges, ProfileUpdate},
  content::{
    Comment, CommentOrder, CommentView, NewComment, NewVideo, Video, VideoChanges,
  },
  engagement::{
    FollowUpRequest, ReactionKind, ReactionTarget, SubscriptionOutcome,
    ToggleState,
  },
  message::PrivateMessage,
};

/// Abstraction over a Vidcast storage backend.
///
/// Every method that touches more than one row (toggles, follow-up
/// acceptance) must be atomic: either all of its writes land or none do.
/// Denormalised counters (`subscriber_count`, `likes`, `dislikes`) are only
/// ever adjusted inside the same transaction as the edge they count.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SocialStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Create an account. Returns `None` if the username or email is taken.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  fn get_account(
    &self,
    id: AccountId,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  fn find_account_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Set the `private` flag. Returns `false` if the account does not exist.
  fn set_private(
    &self,
    id: AccountId,
    private: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Replace the username and biography. Returns `None` if the account does
  /// not exist; a username held by another account is reported as
  /// [`ProfileUpdate::UsernameTaken`] and nothing is written.
  fn update_profile(
    &self,
    id: AccountId,
    changes: ProfileChanges,
  ) -> impl Future<Output = Result<Option<ProfileUpdate>, Self::Error>> + Send + '_;

  /// Persist the last-known online flag and activity timestamp.
  fn set_presence(
    &self,
    id: AccountId,
    online: bool,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Record a session keyed by the digest of its token.
  fn create_session(
    &self,
    account: AccountId,
    token_hash: String,
    expires_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve a token digest to its account, ignoring sessions that expired
  /// before `now`.
  fn session_account(
    &self,
    token_hash: String,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<AccountId>, Self::Error>> + Send + '_;

  fn delete_session(
    &self,
    token_hash: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Subscriptions ─────────────────────────────────────────────────────

  /// Whether the edge `subscriber → channel` exists.
  fn is_subscribed(
    &self,
    subscriber: AccountId,
    channel: AccountId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All channels `subscriber` has an outbound edge to.
  fn subscriptions_of(
    &self,
    subscriber: AccountId,
  ) -> impl Future<Output = Result<Vec<AccountId>, Self::Error>> + Send + '_;

  /// Atomically toggle the edge `actor → channel`.
  ///
  /// Existing edge: removed, counter decremented. No edge and private
  /// channel: a follow-up request is created unless one is already pending.
  /// No edge and public channel: edge created, counter incremented.
  /// Returns `None` if `channel` does not exist. Callers reject
  /// `actor == channel` before calling.
  fn toggle_subscription(
    &self,
    actor: AccountId,
    channel: AccountId,
  ) -> impl Future<Output = Result<Option<SubscriptionOutcome>, Self::Error>>
  + Send
  + '_;

  /// Recompute every denormalised counter from the edge tables.
  /// Returns the number of rows whose stored counter was wrong.
  fn repair_counters(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Follow-up requests ────────────────────────────────────────────────

  fn get_followup(
    &self,
    id: FollowUpId,
  ) -> impl Future<Output = Result<Option<FollowUpRequest>, Self::Error>> + Send + '_;

  /// Pending requests addressed to `owner`, oldest first.
  fn pending_followups(
    &self,
    owner: AccountId,
  ) -> impl Future<Output = Result<Vec<FollowUpRequest>, Self::Error>> + Send + '_;

  /// Atomically delete the request, create the subscription edge and bump
  /// the owner's counter. Returns `None` if no such request is addressed to
  /// `owner`.
  fn accept_followup(
    &self,
    id: FollowUpId,
    owner: AccountId,
  ) -> impl Future<Output = Result<Option<FollowUpRequest>, Self::Error>> + Send + '_;

  /// Delete the request. Returns `false` if no such request is addressed to
  /// `owner`.
  fn deny_followup(
    &self,
    id: FollowUpId,
    owner: AccountId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Content ───────────────────────────────────────────────────────────

  fn create_video(
    &self,
    input: NewVideo,
  ) -> impl Future<Output = Result<Video, Self::Error>> + Send + '_;

  fn get_video(
    &self,
    id: VideoId,
  ) -> impl Future<Output = Result<Option<Video>, Self::Error>> + Send + '_;

  /// Every video owned by `owner`, newest first.
  fn videos_of(
    &self,
    owner: AccountId,
  ) -> impl Future<Output = Result<Vec<Video>, Self::Error>> + Send + '_;

  /// Replace the title and description of a video owned by `owner`.
  /// Returns `None` if no such video belongs to `owner`.
  fn edit_video(
    &self,
    id: VideoId,
    owner: AccountId,
    changes: VideoChanges,
  ) -> impl Future<Output = Result<Option<Video>, Self::Error>> + Send + '_;

  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: CommentId,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// One page of comments under `video`, each annotated with `viewer`'s own
  /// reaction.
  fn list_comments(
    &self,
    video: VideoId,
    viewer: AccountId,
    order: CommentOrder,
    offset: usize,
  ) -> impl Future<Output = Result<Vec<CommentView>, Self::Error>> + Send + '_;

  // ── Reactions ─────────────────────────────────────────────────────────

  /// Atomically toggle `actor`'s `kind` reaction on `target`, clearing the
  /// opposite reaction if present. Returns `None` if the target does not
  /// exist.
  fn toggle_reaction(
    &self,
    actor: AccountId,
    target: ReactionTarget,
    kind: ReactionKind,
  ) -> impl Future<Output = Result<Option<ToggleState>, Self::Error>> + Send + '_;

  fn reaction_of(
    &self,
    actor: AccountId,
    target: ReactionTarget,
  ) -> impl Future<Output = Result<Option<ReactionKind>, Self::Error>> + Send + '_;

  // ── Private messages ──────────────────────────────────────────────────

  fn send_message(
    &self,
    sender: AccountId,
    recipient: AccountId,
    content: String,
  ) -> impl Future<Output = Result<PrivateMessage, Self::Error>> + Send + '_;

  /// One page of the conversation between `a` and `b`, newest first.
  fn conversation(
    &self,
    a: AccountId,
    b: AccountId,
    offset: usize,
  ) -> impl Future<Output = Result<Vec<PrivateMessage>, Self::Error>> + Send + '_;
}
