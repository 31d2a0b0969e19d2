//! Engagement state: reactions, subscriptions and follow-up requests.
//!
//! The types describe the results of the toggle state machine. The functions
//! at the bottom apply the policy that sits in front of the storage
//! transactions: self-action rejection, visibility gating and follow-up
//! ownership checks. The transactions themselves live in the store backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  AccountId, CommentId, Error, FollowUpId, Result, VideoId, graph,
  store::SocialStore,
};

// ─── Reactions ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
  Like,
  Dislike,
}

impl ReactionKind {
  /// The reaction that is mutually exclusive with `self`.
  pub fn opposite(self) -> Self {
    match self {
      Self::Like => Self::Dislike,
      Self::Dislike => Self::Like,
    }
  }
}

/// The entity a reaction is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ReactionTarget {
  Video(VideoId),
  Comment(CommentId),
}

/// Resulting state of a reaction toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
  On,
  Off,
}

impl ToggleState {
  pub fn is_on(self) -> bool { matches!(self, Self::On) }
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

/// Resulting state of a subscription toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionOutcome {
  Subscribed,
  Unsubscribed,
  /// The channel is private; a follow-up request was created.
  RequestSent,
  /// The channel is private and a request from this actor is still pending.
  AlreadyPending,
}

/// A pending request to subscribe to a private account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpRequest {
  pub followup_id:  FollowUpId,
  pub requester_id: AccountId,
  /// The private account the request is addressed to. Only this account may
  /// resolve it.
  pub owner_id:     AccountId,
  pub created_at:   DateTime<Utc>,
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Toggle `actor`'s subscription to `channel`.
///
/// Self-subscription is rejected before the store is touched. Everything else
/// (unsubscribe, follow-up request for private channels, direct subscribe) is
/// decided inside a single store transaction.
pub async fn toggle_subscription<S>(
  store: &S,
  actor: AccountId,
  channel: AccountId,
) -> Result<SubscriptionOutcome>
where
  S: SocialStore,
{
  if actor == channel {
    return Err(Error::SelfAction);
  }
  store
    .toggle_subscription(actor, channel)
    .await
    .map_err(Error::store)?
    .ok_or(Error::AccountNotFound(channel))
}

/// Toggle `actor`'s `kind` reaction on `target`.
///
/// Reacting requires the target's owner to be visible to the actor.
pub async fn toggle_reaction<S>(
  store: &S,
  actor: AccountId,
  target: ReactionTarget,
  kind: ReactionKind,
) -> Result<ToggleState>
where
  S: SocialStore,
{
  let owner = target_owner(store, target).await?;
  if !graph::is_visible(store, actor, owner).await? {
    return Err(Error::Permission("this account is private".into()));
  }
  store
    .toggle_reaction(actor, target, kind)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| not_found(target))
}

/// Accept a pending follow-up request addressed to `owner`.
///
/// The stored request is authoritative: its owner must be `owner` and its
/// requester must match what the client claims.
pub async fn accept_followup<S>(
  store: &S,
  owner: AccountId,
  followup_id: FollowUpId,
  requester: AccountId,
) -> Result<FollowUpRequest>
where
  S: SocialStore,
{
  let request = owned_followup(store, owner, followup_id).await?;
  if request.requester_id != requester {
    return Err(Error::Invalid(format!(
      "follow-up request {followup_id} was not sent by account {requester}"
    )));
  }
  store
    .accept_followup(followup_id, owner)
    .await
    .map_err(Error::store)?
    .ok_or(Error::FollowUpNotFound(followup_id))
}

/// Deny (delete) a pending follow-up request addressed to `owner`.
pub async fn deny_followup<S>(
  store: &S,
  owner: AccountId,
  followup_id: FollowUpId,
) -> Result<()>
where
  S: SocialStore,
{
  owned_followup(store, owner, followup_id).await?;
  let deleted = store
    .deny_followup(followup_id, owner)
    .await
    .map_err(Error::store)?;
  if deleted {
    Ok(())
  } else {
    Err(Error::FollowUpNotFound(followup_id))
  }
}

async fn owned_followup<S>(
  store: &S,
  owner: AccountId,
  followup_id: FollowUpId,
) -> Result<FollowUpRequest>
where
  S: SocialStore,
{
  let request = store
    .get_followup(followup_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::FollowUpNotFound(followup_id))?;
  if request.owner_id != owner {
    return Err(Error::Permission(
      "only the requested account can resolve a follow-up request".into(),
    ));
  }
  Ok(request)
}

/// The account that owns the content behind `target`.
pub async fn target_owner<S>(store: &S, target: ReactionTarget) -> Result<AccountId>
where
  S: SocialStore,
{
  match target {
    ReactionTarget::Video(id) => store
      .get_video(id)
      .await
      .map_err(Error::store)?
      .map(|v| v.owner_id)
      .ok_or(Error::VideoNotFound(id)),
    ReactionTarget::Comment(id) => {
      let comment = store
        .get_comment(id)
        .await
        .map_err(Error::store)?
        .ok_or(Error::CommentNotFound(id))?;
      // Visibility of a comment follows the video it was posted under.
      store
        .get_video(comment.video_id)
        .await
        .map_err(Error::store)?
        .map(|v| v.owner_id)
        .ok_or(Error::VideoNotFound(comment.video_id))
    }
  }
}

fn not_found(target: ReactionTarget) -> Error {
  match target {
    ReactionTarget::Video(id) => Error::VideoNotFound(id),
    ReactionTarget::Comment(id) => Error::CommentNotFound(id),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn opposite_reactions() {
    assert_eq!(ReactionKind::Like.opposite(), ReactionKind::Dislike);
    assert_eq!(ReactionKind::Dislike.opposite(), ReactionKind::Like);
  }

  #[test]
  fn subscription_outcome_serialises_snake_case() {
    let json = serde_json::to_string(&SubscriptionOutcome::AlreadyPending).unwrap();
    assert_eq!(json, "\"already_pending\"");
  }
}
