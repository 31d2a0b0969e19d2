//! Handlers for video metadata and comments.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/videos` | Body: `{"title", "description"?}` |
//! | `GET`  | `/api/videos/{id}` | 403 if the owner is private and not followed |
//! | `PUT`  | `/api/videos/{id}` | Owner only. Body: `{"title", "description"?}` |
//! | `POST` | `/api/videos/{id}/comments` | Body: `{"content"}` |
//! | `GET`  | `/api/videos/{id}/comments` | `?order=likes\|recent\|old&offset=` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use vidcast_core::{
  AccountId, VideoId,
  channel,
  content::{CommentOrder, CommentView, NewComment, NewVideo, Video, VideoChanges},
  graph,
  store::SocialStore,
};

use super::store_err;
use crate::{
  AppState,
  auth::CurrentAccount,
  error::{Error, Result},
};

/// Load a video and check that `viewer` may see it.
async fn visible_video<S>(state: &AppState<S>, viewer: AccountId, id: VideoId) -> Result<Video>
where
  S: SocialStore + 'static,
{
  let video = state
    .store
    .get_video(id)
    .await
    .map_err(store_err::<S>)?
    .ok_or_else(|| Error::NotFound(format!("video not found: {id}")))?;
  if !graph::is_visible(state.store.as_ref(), viewer, video.owner_id).await? {
    return Err(Error::Forbidden("this account is private".into()));
  }
  Ok(video)
}

// ─── Videos ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateVideoBody {
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
}

/// `POST /api/videos`
pub async fn create_video<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Json(body): Json<CreateVideoBody>,
) -> Result<impl IntoResponse>
where
  S: SocialStore + 'static,
{
  let title = body.title.trim();
  if title.is_empty() {
    return Err(Error::BadRequest("title must not be empty".into()));
  }
  let description = body
    .description
    .map(|d| d.trim().to_owned())
    .filter(|d| !d.is_empty());

  let video = state
    .store
    .create_video(NewVideo { owner_id: me, title: title.to_owned(), description })
    .await
    .map_err(store_err::<S>)?;
  Ok((StatusCode::CREATED, Json(video)))
}

/// `GET /api/videos/{id}`
pub async fn get_video<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(id): Path<VideoId>,
) -> Result<Json<Video>>
where
  S: SocialStore + 'static,
{
  Ok(Json(visible_video(&state, me, id).await?))
}

/// `PUT /api/videos/{id}`
pub async fn edit_video<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(id): Path<VideoId>,
  Json(body): Json<CreateVideoBody>,
) -> Result<Json<Video>>
where
  S: SocialStore + 'static,
{
  let changes = VideoChanges::new(&body.title, body.description.as_deref())?;
  let video = channel::edit_video(state.store.as_ref(), me, id, changes).await?;
  tracing::info!(video = %id, owner = %me, "video edited");
  Ok(Json(video))
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub content: String,
}

/// `POST /api/videos/{id}/comments`
pub async fn post_comment<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(id): Path<VideoId>,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse>
where
  S: SocialStore + 'static,
{
  let video = visible_video(&state, me, id).await?;
  let input = NewComment::new(video.video_id, me, &body.content)?;
  let comment = state
    .store
    .add_comment(input)
    .await
    .map_err(store_err::<S>)?;
  Ok((StatusCode::CREATED, Json(comment)))
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentListParams {
  #[serde(default)]
  pub order:  CommentOrder,
  #[serde(default)]
  pub offset: usize,
}

/// `GET /api/videos/{id}/comments`
pub async fn list_comments<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(id): Path<VideoId>,
  Query(params): Query<CommentListParams>,
) -> Result<Json<Vec<CommentView>>>
where
  S: SocialStore + 'static,
{
  let video = visible_video(&state, me, id).await?;
  let comments = state
    .store
    .list_comments(video.video_id, me, params.order, params.offset)
    .await
    .map_err(store_err::<S>)?;
  Ok(Json(comments))
}
