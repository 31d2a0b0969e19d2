//! Handlers for private messaging between mutual contacts.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/chats` | The caller's contacts |
//! | `GET`  | `/api/chats/{id}` | Conversation page, newest first, `?offset=` |
//! | `POST` | `/api/chats/{id}` | Body: `{"content"}`; pushed to both sides |
//! | `GET`  | `/api/chats/{id}/contact` | One contact's summary |
//!
//! Everything except the contact list requires a mutual subscription.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use vidcast_core::{
  AccountId,
  account::ContactSummary,
  graph,
  message::PrivateMessage,
  store::SocialStore,
};

use super::{Page, store_err};
use crate::{
  AppState,
  auth::CurrentAccount,
  error::{Error, Result},
};

async fn summary<S>(state: &AppState<S>, id: AccountId) -> Result<Option<ContactSummary>>
where
  S: SocialStore + 'static,
{
  let account = state
    .store
    .get_account(id)
    .await
    .map_err(store_err::<S>)?;
  Ok(account.as_ref().map(ContactSummary::from))
}

/// `GET /api/chats`
pub async fn contacts<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
) -> Result<Json<Vec<ContactSummary>>>
where
  S: SocialStore + 'static,
{
  let ids = graph::contacts_of(state.store.as_ref(), me).await?;
  let mut contacts = Vec::with_capacity(ids.len());
  for id in ids {
    if let Some(contact) = summary(&state, id).await? {
      contacts.push(contact);
    }
  }
  Ok(Json(contacts))
}

/// `GET /api/chats/{id}`
pub async fn history<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(other): Path<AccountId>,
  Query(page): Query<Page>,
) -> Result<Json<Vec<PrivateMessage>>>
where
  S: SocialStore + 'static,
{
  graph::require_mutual(state.store.as_ref(), me, other).await?;
  let messages = state
    .store
    .conversation(me, other, page.offset)
    .await
    .map_err(store_err::<S>)?;
  Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
pub struct SendBody {
  pub content: String,
}

/// `POST /api/chats/{id}`
///
/// The message is persisted first; pushing it to open chat connections is
/// best-effort and never fails the request.
pub async fn send<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(other): Path<AccountId>,
  Json(body): Json<SendBody>,
) -> Result<impl IntoResponse>
where
  S: SocialStore + 'static,
{
  let content = body.content.trim();
  if content.is_empty() {
    return Err(Error::BadRequest("message must not be empty".into()));
  }
  graph::require_mutual(state.store.as_ref(), me, other).await?;

  let message = state
    .store
    .send_message(me, other, content.to_owned())
    .await
    .map_err(store_err::<S>)?;

  match state.chat.deliver(&message) {
    Ok(delivered) => tracing::debug!(from = %me, to = %other, delivered, "chat message pushed"),
    Err(e) => tracing::warn!(from = %me, to = %other, error = %e, "chat push failed"),
  }
  Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /api/chats/{id}/contact`
pub async fn contact<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(other): Path<AccountId>,
) -> Result<Json<ContactSummary>>
where
  S: SocialStore + 'static,
{
  graph::require_mutual(state.store.as_ref(), me, other).await?;
  summary(&state, other)
    .await?
    .map(Json)
    .ok_or_else(|| Error::NotFound(format!("account not found: {other}")))
}
