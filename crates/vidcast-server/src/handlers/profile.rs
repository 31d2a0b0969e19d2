//! Handlers for channel pages and the caller's own profile.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/home` | The caller's own account |
//! | `GET`  | `/api/profile/{username}` | Videos only if the channel is visible |
//! | `GET`  | `/api/settings/profile` | `{"username","biography"}` |
//! | `POST` | `/api/settings/profile` | Body: `{"username","biography"?}`; 409 if taken |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use vidcast_core::{
  AccountId,
  account::{Account, Profile, ProfileChanges},
  channel,
  store::SocialStore,
};

use super::store_err;
use crate::{
  AppState,
  auth::CurrentAccount,
  error::{Error, Result},
};

async fn own_account<S>(state: &AppState<S>, me: AccountId) -> Result<Account>
where
  S: SocialStore + 'static,
{
  state
    .store
    .get_account(me)
    .await
    .map_err(store_err::<S>)?
    .ok_or_else(|| Error::NotFound(format!("account not found: {me}")))
}

/// `GET /api/home`
pub async fn home<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
) -> Result<Json<Account>>
where
  S: SocialStore + 'static,
{
  Ok(Json(own_account(&state, me).await?))
}

/// `GET /api/profile/{username}`
pub async fn profile<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Path(username): Path<String>,
) -> Result<Json<Profile>>
where
  S: SocialStore + 'static,
{
  channel::profile(state.store.as_ref(), me, &username)
    .await?
    .map(Json)
    .ok_or_else(|| Error::NotFound(format!("no account named {username:?}")))
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileBody {
  pub username:  String,
  #[serde(default)]
  pub biography: Option<String>,
}

/// `GET /api/settings/profile`
pub async fn profile_data<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
) -> Result<Json<ProfileBody>>
where
  S: SocialStore + 'static,
{
  let account = own_account(&state, me).await?;
  Ok(Json(ProfileBody { username: account.username, biography: account.biography }))
}

/// `POST /api/settings/profile`
pub async fn update_profile<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Json(body): Json<ProfileBody>,
) -> Result<Json<Account>>
where
  S: SocialStore + 'static,
{
  let changes = ProfileChanges::new(&body.username, body.biography.as_deref())?;
  let account = channel::update_profile(state.store.as_ref(), me, changes).await?;
  tracing::info!(account = %me, "profile updated");
  Ok(Json(account))
}
