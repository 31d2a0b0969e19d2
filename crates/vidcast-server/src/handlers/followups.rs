//! Handlers for follow-up requests on private accounts (the "mail" view).
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/followups` | Pending requests addressed to the caller |
//! | `POST` | `/api/followups/{id}/accept` | Body: `{"requester_id": int}` |
//! | `POST` | `/api/followups/{id}/deny` | 204 on success |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Deserialize;
use vidcast_core::{
  AccountId, FollowUpId,
  engagement::{self, FollowUpRequest},
  store::SocialStore,
};

use super::store_err;
use crate::{AppState, auth::CurrentAccount, error::Result};

/// `GET /api/followups`
pub async fn pending<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
) -> Result<Json<Vec<FollowUpRequest>>>
where
  S: SocialStore + 'static,
{
  let requests = state
    .store
    .pending_followups(me)
    .await
    .map_err(store_err::<S>)?;
  Ok(Json(requests))
}

#[derive(Debug, Deserialize)]
pub struct AcceptBody {
  pub requester_id: AccountId,
}

/// `POST /api/followups/{id}/accept`
pub async fn accept<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(id): Path<FollowUpId>,
  Json(body): Json<AcceptBody>,
) -> Result<Json<FollowUpRequest>>
where
  S: SocialStore + 'static,
{
  let request =
    engagement::accept_followup(state.store.as_ref(), me, id, body.requester_id).await?;
  tracing::info!(owner = %me, requester = %request.requester_id, "follow-up accepted");
  Ok(Json(request))
}

/// `POST /api/followups/{id}/deny`
pub async fn deny<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(id): Path<FollowUpId>,
) -> Result<StatusCode>
where
  S: SocialStore + 'static,
{
  engagement::deny_followup(state.store.as_ref(), me, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
