//! Session authentication: credential hashing, session tokens and extractors.
//!
//! A session token is 32 random bytes, base64url-encoded and handed to the
//! client in the `session_token` cookie. Only its SHA-256 digest is stored,
//! so a leaked database cannot be replayed as live sessions.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::Utc;
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use vidcast_core::{AccountId, store::SocialStore};

use crate::{AppState, ServerConfig, error::Error};

pub const SESSION_COOKIE: &str = "session_token";

// ─── Credentials ─────────────────────────────────────────────────────────────

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Internal(format!("argon2 error: {e}")))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Session tokens ──────────────────────────────────────────────────────────

pub fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  B64.encode(bytes)
}

/// Hex SHA-256 digest of a token; the form sessions are stored under.
pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// The cookie carrying a freshly issued session token. It has no max-age;
/// expiry is enforced server-side by the session row.
pub fn session_cookie(token: String, config: &ServerConfig) -> Cookie<'static> {
  Cookie::build((SESSION_COOKIE, token))
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(config.secure_cookies)
    .build()
}

/// A cookie that clears the session token on the client.
pub fn removal_cookie() -> Cookie<'static> {
  Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// The outcome of checking a request's session cookie.
///
/// Pattern-matched by handlers that must react to a missing session
/// themselves (WebSocket upgrades close with a policy violation instead of
/// answering 401).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authentication {
  Authenticated { account_id: AccountId },
  Unauthenticated,
}

impl Authentication {
  pub fn account_id(self) -> Option<AccountId> {
    match self {
      Authentication::Authenticated { account_id } => Some(account_id),
      Authentication::Unauthenticated => None,
    }
  }
}

/// Resolve the session cookie in `jar` to an account. Store failures are
/// errors; a missing, unknown or expired token is `Unauthenticated`.
pub async fn authenticate<S>(store: &S, jar: &CookieJar) -> Result<Authentication, Error>
where
  S: SocialStore,
{
  let Some(cookie) = jar.get(SESSION_COOKIE) else {
    return Ok(Authentication::Unauthenticated);
  };
  let account = store
    .session_account(hash_token(cookie.value()), Utc::now())
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(match account {
    Some(account_id) => Authentication::Authenticated { account_id },
    None => Authentication::Unauthenticated,
  })
}

impl<S> FromRequestParts<AppState<S>> for Authentication
where
  S: SocialStore + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let jar = CookieJar::from_headers(&parts.headers);
    authenticate(state.store.as_ref(), &jar).await
  }
}

/// The authenticated caller. Rejects with 401 when there is no valid session.
#[derive(Debug, Clone, Copy)]
pub struct CurrentAccount(pub AccountId);

impl<S> FromRequestParts<AppState<S>> for CurrentAccount
where
  S: SocialStore + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    Authentication::from_request_parts(parts, state)
      .await?
      .account_id()
      .map(CurrentAccount)
      .ok_or(Error::Unauthorized)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::http::{Request, header};
  use chrono::Duration;
  use vidcast_core::account::NewAccount;
  use vidcast_store_sqlite::SqliteStore;

  use super::*;

  async fn make_state() -> (AppState<SqliteStore>, AccountId) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let account = store
      .create_account(NewAccount {
        username:      "alice".into(),
        email:         "alice@example.com".into(),
        password_hash: hash_password("hunter22").unwrap(),
      })
      .await
      .unwrap()
      .unwrap();
    (AppState::new(Arc::new(store), ServerConfig::default()), account.account_id)
  }

  async fn extract(state: &AppState<SqliteStore>, cookie: Option<&str>) -> Result<CurrentAccount, Error> {
    let mut builder = Request::builder();
    if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
    }
    let (mut parts, _) = builder.body(axum::body::Body::empty()).unwrap().into_parts();
    CurrentAccount::from_request_parts(&mut parts, state).await
  }

  #[test]
  fn password_round_trip() {
    let phc = hash_password("correct horse").unwrap();
    assert!(verify_password("correct horse", &phc));
    assert!(!verify_password("wrong horse", &phc));
    assert!(!verify_password("correct horse", "not a phc string"));
  }

  #[test]
  fn tokens_are_unique_and_hash_stably() {
    let (a, b) = (generate_token(), generate_token());
    assert_ne!(a, b);
    assert_eq!(hash_token(&a), hash_token(&a));
    assert_eq!(hash_token(&a).len(), 64);
  }

  #[tokio::test]
  async fn valid_session_authenticates() {
    let (state, alice) = make_state().await;
    let token = generate_token();
    state
      .store
      .create_session(alice, hash_token(&token), Utc::now() + Duration::hours(1))
      .await
      .unwrap();

    let current = extract(&state, Some(&format!("{SESSION_COOKIE}={token}"))).await.unwrap();
    assert_eq!(current.0, alice);
  }

  #[tokio::test]
  async fn missing_cookie_is_unauthorized() {
    let (state, _) = make_state().await;
    assert!(matches!(extract(&state, None).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn expired_or_unknown_token_is_unauthorized() {
    let (state, alice) = make_state().await;
    let token = generate_token();
    state
      .store
      .create_session(alice, hash_token(&token), Utc::now() - Duration::minutes(1))
      .await
      .unwrap();

    let expired = extract(&state, Some(&format!("{SESSION_COOKIE}={token}"))).await;
    assert!(matches!(expired, Err(Error::Unauthorized)));
    let unknown = extract(&state, Some(&format!("{SESSION_COOKIE}=bogus"))).await;
    assert!(matches!(unknown, Err(Error::Unauthorized)));
  }
}
