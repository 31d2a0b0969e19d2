//! `POST /api/presence`: HTTP heartbeat for clients that poll instead of (or
//! alongside) holding the presence socket.
//!
//! A heartbeat always records the caller online with a fresh `last_active`;
//! `reached` counts the contacts re-notified over their presence sockets.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use vidcast_core::store::SocialStore;

use crate::{AppState, auth::CurrentAccount, error::Result};

pub async fn heartbeat<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
) -> Result<Json<Value>>
where
  S: SocialStore + 'static,
{
  let reached = state.presence.heartbeat(me).await;
  Ok(Json(json!({ "online": true, "reached": reached })))
}
