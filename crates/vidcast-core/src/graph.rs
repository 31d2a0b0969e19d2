//! Social graph queries: visibility, mutual subscription and contact sets.
//!
//! These are derived relations computed from subscription edges on demand;
//! nothing here is stored.

use std::collections::BTreeSet;

use crate::{AccountId, Error, Result, store::SocialStore};

/// Whether `viewer` may see content owned by `owner`.
///
/// True when the owner's account is public, when viewer and owner are the
/// same account, or when `viewer` subscribes to `owner`.
pub async fn is_visible<S>(store: &S, viewer: AccountId, owner: AccountId) -> Result<bool>
where
  S: SocialStore,
{
  if viewer == owner {
    return Ok(true);
  }
  let account = store
    .get_account(owner)
    .await
    .map_err(Error::store)?
    .ok_or(Error::AccountNotFound(owner))?;
  if !account.private {
    return Ok(true);
  }
  store.is_subscribed(viewer, owner).await.map_err(Error::store)
}

/// Whether `a` and `b` each subscribe to the other.
///
/// Private messaging is gated on this, which is deliberately stricter than
/// [`is_visible`].
pub async fn mutual_subscription<S>(store: &S, a: AccountId, b: AccountId) -> Result<bool>
where
  S: SocialStore,
{
  if a == b {
    return Ok(false);
  }
  Ok(
    store.is_subscribed(a, b).await.map_err(Error::store)?
      && store.is_subscribed(b, a).await.map_err(Error::store)?,
  )
}

/// All accounts in a mutual subscription with `account`.
///
/// Costs one lookup per outbound edge. Callers on hot paths (presence) compute
/// this once per connection and cache it.
pub async fn contacts_of<S>(store: &S, account: AccountId) -> Result<BTreeSet<AccountId>>
where
  S: SocialStore,
{
  let outbound = store
    .subscriptions_of(account)
    .await
    .map_err(Error::store)?;

  let mut contacts = BTreeSet::new();
  for target in outbound {
    if store
      .is_subscribed(target, account)
      .await
      .map_err(Error::store)?
    {
      contacts.insert(target);
    }
  }
  Ok(contacts)
}

/// Fail with [`Error::Permission`] unless `a` and `b` are mutual contacts.
pub async fn require_mutual<S>(store: &S, a: AccountId, b: AccountId) -> Result<()>
where
  S: SocialStore,
{
  if mutual_subscription(store, a, b).await? {
    Ok(())
  } else {
    Err(Error::Permission(
      "both accounts must subscribe to each other to chat".into(),
    ))
  }
}
