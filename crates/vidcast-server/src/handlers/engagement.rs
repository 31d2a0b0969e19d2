//! Handlers for reaction and subscription toggles.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `POST` | `/api/videos/{id}/like` | `{"like": bool}` |
//! | `POST` | `/api/videos/{id}/dislike` | `{"dislike": bool}` |
//! | `POST` | `/api/comments/{id}/like` | `{"like": bool}` |
//! | `POST` | `/api/comments/{id}/dislike` | `{"dislike": bool}` |
//! | `POST` | `/api/accounts/{id}/subscribe` | `{"state": "subscribed"\|…}` |

use axum::{
  Json,
  extract::{Path, State},
};
use serde_json::{Value, json};
use vidcast_core::{
  AccountId, CommentId, VideoId,
  engagement::{self, ReactionKind, ReactionTarget},
  store::SocialStore,
};

use crate::{AppState, auth::CurrentAccount, error::Result};

async fn react<S>(
  state: &AppState<S>,
  actor: AccountId,
  target: ReactionTarget,
  kind: ReactionKind,
) -> Result<Json<Value>>
where
  S: SocialStore + 'static,
{
  let toggled = engagement::toggle_reaction(state.store.as_ref(), actor, target, kind).await?;
  tracing::debug!(%actor, ?target, ?kind, ?toggled, "reaction toggled");
  let key = match kind {
    ReactionKind::Like => "like",
    ReactionKind::Dislike => "dislike",
  };
  Ok(Json(json!({ key: toggled.is_on() })))
}

/// `POST /api/videos/{id}/like`
pub async fn like_video<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(id): Path<VideoId>,
) -> Result<Json<Value>>
where
  S: SocialStore + 'static,
{
  react(&state, me, ReactionTarget::Video(id), ReactionKind::Like).await
}

/// `POST /api/videos/{id}/dislike`
pub async fn dislike_video<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(id): Path<VideoId>,
) -> Result<Json<Value>>
where
  S: SocialStore + 'static,
{
  react(&state, me, ReactionTarget::Video(id), ReactionKind::Dislike).await
}

/// `POST /api/comments/{id}/like`
pub async fn like_comment<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(id): Path<CommentId>,
) -> Result<Json<Value>>
where
  S: SocialStore + 'static,
{
  react(&state, me, ReactionTarget::Comment(id), ReactionKind::Like).await
}

/// `POST /api/comments/{id}/dislike`
pub async fn dislike_comment<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(id): Path<CommentId>,
) -> Result<Json<Value>>
where
  S: SocialStore + 'static,
{
  react(&state, me, ReactionTarget::Comment(id), ReactionKind::Dislike).await
}

/// `POST /api/accounts/{id}/subscribe`
pub async fn subscribe<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(channel): Path<AccountId>,
) -> Result<Json<Value>>
where
  S: SocialStore + 'static,
{
  let outcome = engagement::toggle_subscription(state.store.as_ref(), me, channel).await?;
  tracing::debug!(subscriber = %me, %channel, ?outcome, "subscription toggled");
  Ok(Json(json!({ "state": outcome })))
}
