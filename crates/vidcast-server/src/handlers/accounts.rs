//! Handlers for registration, login, logout and account settings.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/register` | Body: `{"username","email","password"}` |
//! | `POST` | `/api/login` | Sets the `session_token` cookie |
//! | `POST` | `/api/logout` | Deletes the session and clears the cookie |
//! | `POST` | `/api/settings/privacy` | Body: `{"private": bool}` |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use vidcast_core::{
  account::{Account, NewAccount},
  store::SocialStore,
};

use super::store_err;
use crate::{
  AppState,
  auth::{self, CurrentAccount, SESSION_COOKIE},
  error::{Error, Result},
};

const MIN_PASSWORD_CHARS: usize = 8;

// ─── Register ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username: String,
  pub email:    String,
  pub password: String,
}

/// `POST /api/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse>
where
  S: SocialStore + 'static,
{
  let username = body.username.trim();
  let email = body.email.trim();
  if username.is_empty() {
    return Err(Error::BadRequest("username must not be empty".into()));
  }
  if !email.contains('@') {
    return Err(Error::BadRequest("email address is not valid".into()));
  }
  if body.password.chars().count() < MIN_PASSWORD_CHARS {
    return Err(Error::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_CHARS} characters"
    )));
  }

  let account = state
    .store
    .create_account(NewAccount {
      username:      username.to_owned(),
      email:         email.to_owned(),
      password_hash: auth::hash_password(&body.password)?,
    })
    .await
    .map_err(store_err::<S>)?
    .ok_or_else(|| Error::Conflict("username or email already taken".into()))?;

  tracing::info!(account = %account.account_id, "account registered");
  Ok((StatusCode::CREATED, Json(account)))
}

// ─── Login / logout ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /api/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  Json(body): Json<LoginBody>,
) -> Result<(CookieJar, Json<Account>)>
where
  S: SocialStore + 'static,
{
  let account = state
    .store
    .find_account_by_username(body.username.trim())
    .await
    .map_err(store_err::<S>)?
    .filter(|account| auth::verify_password(&body.password, &account.password_hash))
    .ok_or(Error::Unauthorized)?;

  let token = auth::generate_token();
  let expires_at = Utc::now() + Duration::hours(state.config.session_ttl_hours);
  state
    .store
    .create_session(account.account_id, auth::hash_token(&token), expires_at)
    .await
    .map_err(store_err::<S>)?;

  tracing::info!(account = %account.account_id, "session opened");
  let jar = jar.add(auth::session_cookie(token, &state.config));
  Ok((jar, Json(account)))
}

/// `POST /api/logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
) -> Result<(CookieJar, StatusCode)>
where
  S: SocialStore + 'static,
{
  if let Some(cookie) = jar.get(SESSION_COOKIE) {
    state
      .store
      .delete_session(auth::hash_token(cookie.value()))
      .await
      .map_err(store_err::<S>)?;
  }
  Ok((jar.remove(auth::removal_cookie()), StatusCode::NO_CONTENT))
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PrivacyBody {
  pub private: bool,
}

/// `POST /api/settings/privacy`
pub async fn set_privacy<S>(
  State(state): State<AppState<S>>,
  CurrentAccount(me): CurrentAccount,
  Json(body): Json<PrivacyBody>,
) -> Result<Json<Value>>
where
  S: SocialStore + 'static,
{
  let updated = state
    .store
    .set_private(me, body.private)
    .await
    .map_err(store_err::<S>)?;
  if !updated {
    return Err(Error::NotFound(format!("account not found: {me}")));
  }
  Ok(Json(json!({ "private": body.private })))
}
