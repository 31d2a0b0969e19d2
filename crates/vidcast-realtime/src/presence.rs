//! Presence registry and broadcast protocol.
//!
//! Each account holds at most one presence connection. Its contact set is
//! resolved once at connect time and cached beside the connection, so the
//! OFFLINE broadcast on disconnect reaches exactly the peers that were told
//! about the ONLINE transition, even if the social graph changed meanwhile.

use std::{collections::BTreeSet, sync::Arc};

use chrono::Utc;
use dashmap::DashMap;
use vidcast_core::{
  AccountId, Error, graph, message::PresenceUpdate, store::SocialStore,
};

use crate::{CloseReason, ConnId, Connection};

pub type Contacts = Arc<BTreeSet<AccountId>>;

#[derive(Debug, Clone)]
struct PresenceEntry {
  conn:     Connection,
  contacts: Contacts,
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Account → its single presence connection and cached contact set.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
  entries: DashMap<AccountId, PresenceEntry>,
}

impl PresenceRegistry {
  pub fn new() -> Self { Self::default() }

  /// Register `conn` for `account`, replacing any previous connection.
  /// Returns the superseded connection; it is no longer reachable through
  /// the registry and the caller is expected to close it.
  pub fn register(
    &self,
    account: AccountId,
    conn: Connection,
    contacts: Contacts,
  ) -> Option<Connection> {
    self
      .entries
      .insert(account, PresenceEntry { conn, contacts })
      .map(|old| old.conn)
  }

  /// Remove the entry for `account` only if it still belongs to `conn`.
  /// Returns the contact set captured when `conn` registered.
  pub fn unregister(&self, account: AccountId, conn: ConnId) -> Option<Contacts> {
    self
      .entries
      .remove_if(&account, |_, entry| entry.conn.id() == conn)
      .map(|(_, entry)| entry.contacts)
  }

  pub fn contacts(&self, account: AccountId) -> Option<Contacts> {
    self.entries.get(&account).map(|e| e.contacts.clone())
  }

  pub fn is_online(&self, account: AccountId) -> bool {
    self.entries.contains_key(&account)
  }

  pub fn online_count(&self) -> usize { self.entries.len() }

  /// The connection currently registered for `account`, if any.
  pub fn connection(&self, account: AccountId) -> Option<ConnId> {
    self.entries.get(&account).map(|e| e.conn.id())
  }

  /// Send `frame` to the presence connection of `account`, if there is one.
  pub fn send(&self, account: AccountId, frame: &str) -> bool {
    // Clone out of the shard so the lock is released before sending.
    let conn = self.entries.get(&account).map(|e| e.conn.clone());
    conn.is_some_and(|c| c.send(frame))
  }

  /// Push `update` to every contact with a live presence connection.
  /// Contacts without one are skipped. Returns the number reached.
  pub fn broadcast(&self, update: PresenceUpdate, contacts: &BTreeSet<AccountId>) -> usize {
    let frame = match update.to_text() {
      Ok(frame) => frame,
      Err(e) => {
        tracing::warn!(error = %e, "failed to encode presence update");
        return 0;
      }
    };

    let mut reached = 0;
    for &contact in contacts {
      if self.send(contact, &frame) {
        reached += 1;
      } else {
        tracing::debug!(
          from = %update.user_id, to = %contact, "contact has no live presence connection"
        );
      }
    }
    reached
  }
}

// ─── Protocol ────────────────────────────────────────────────────────────────

/// The presence protocol bound to a store and a registry.
pub struct Presence<S> {
  store:    Arc<S>,
  registry: Arc<PresenceRegistry>,
}

impl<S> Clone for Presence<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), registry: self.registry.clone() }
  }
}

impl<S> Presence<S>
where
  S: SocialStore + 'static,
{
  pub fn new(store: Arc<S>, registry: Arc<PresenceRegistry>) -> Self {
    Self { store, registry }
  }

  pub fn registry(&self) -> &Arc<PresenceRegistry> { &self.registry }

  /// Bring `account` online over `conn`.
  ///
  /// Resolves and caches the contact set, registers the connection, persists
  /// the online flag and announces ONLINE to every connected contact. A
  /// connection already registered for the account is sent a
  /// [`CloseReason::Superseded`] close; its guard later finds itself
  /// unregistered and does nothing. The returned guard takes the account
  /// offline again when closed or dropped.
  pub async fn connect(
    &self,
    account: AccountId,
    conn: Connection,
  ) -> vidcast_core::Result<PresenceGuard<S>> {
    let contacts: Contacts = Arc::new(graph::contacts_of(self.store.as_ref(), account).await?);
    let conn_id = conn.id();

    if let Some(old) = self.registry.register(account, conn, contacts.clone()) {
      tracing::info!(%account, superseded = %old.id(), "presence connection replaced");
      old.close(CloseReason::Superseded);
    }
    tracing::info!(%account, conn = %conn_id, contacts = contacts.len(), "presence online");

    self.persist(account, true).await;
    self.registry.broadcast(PresenceUpdate::online(account), &contacts);

    Ok(PresenceGuard {
      presence: self.clone(),
      account,
      conn: conn_id,
      released: false,
    })
  }

  /// Mark `account` active: persist it online with a fresh `last_active`
  /// and re-announce ONLINE to the cached contacts.
  ///
  /// Accounts without a live presence connection are still recorded online
  /// (a polling client is active); there is nobody to announce to, so they
  /// reach zero contacts. Returns the number of contacts reached.
  pub async fn heartbeat(&self, account: AccountId) -> usize {
    let reached = match self.registry.contacts(account) {
      Some(contacts) => self.registry.broadcast(PresenceUpdate::online(account), &contacts),
      None => 0,
    };
    self.persist(account, true).await;
    reached
  }

  /// Take `conn` offline. Returns `false` if `conn` was no longer the
  /// registered connection for `account`, in which case nothing is
  /// broadcast or persisted.
  pub async fn disconnect(&self, account: AccountId, conn: ConnId) -> bool {
    if !self.release(account, conn) {
      return false;
    }
    self.persist_offline(account).await;
    true
  }

  /// The synchronous half of disconnect: unregister and broadcast OFFLINE.
  fn release(&self, account: AccountId, conn: ConnId) -> bool {
    let Some(contacts) = self.registry.unregister(account, conn) else {
      tracing::debug!(%account, %conn, "presence connection already superseded");
      return false;
    };
    self.registry.broadcast(PresenceUpdate::offline(account), &contacts);
    tracing::info!(%account, %conn, "presence offline");
    true
  }

  /// Record `account` offline unless a newer connection has registered.
  ///
  /// A reconnect can register while the offline write is in flight; the
  /// second check restores the online flag so the last write agrees with the
  /// registry.
  async fn persist_offline(&self, account: AccountId) {
    if self.registry.is_online(account) {
      return;
    }
    self.persist(account, false).await;
    if self.registry.is_online(account) {
      tracing::debug!(%account, "reconnected during offline write");
      self.persist(account, true).await;
    }
  }

  /// Best-effort: failures are logged, never returned.
  async fn persist(&self, account: AccountId, online: bool) {
    if let Err(e) = self.store.set_presence(account, online, Utc::now()).await {
      tracing::warn!(%account, online, error = %Error::store(e), "failed to persist presence");
    }
  }
}

// ─── Guard ───────────────────────────────────────────────────────────────────

/// Takes a presence connection offline exactly once.
///
/// Prefer [`PresenceGuard::close`], which awaits the offline write. If the
/// guard is dropped instead (error path, panic, cancelled task) the registry
/// and broadcast work happens inline and the store write is spawned onto the
/// current runtime.
pub struct PresenceGuard<S>
where
  S: SocialStore + 'static,
{
  presence: Presence<S>,
  account:  AccountId,
  conn:     ConnId,
  released: bool,
}

impl<S> PresenceGuard<S>
where
  S: SocialStore + 'static,
{
  pub fn account(&self) -> AccountId { self.account }

  pub fn conn_id(&self) -> ConnId { self.conn }

  pub async fn close(mut self) {
    self.released = true;
    self.presence.disconnect(self.account, self.conn).await;
  }
}

impl<S> Drop for PresenceGuard<S>
where
  S: SocialStore + 'static,
{
  fn drop(&mut self) {
    if self.released {
      return;
    }
    self.released = true;
    if !self.presence.release(self.account, self.conn) {
      return;
    }

    let presence = self.presence.clone();
    let account = self.account;
    match tokio::runtime::Handle::try_current() {
      Ok(handle) => {
        handle.spawn(async move { presence.persist_offline(account).await });
      }
      Err(_) => {
        tracing::warn!(%account, "no runtime to persist offline presence");
      }
    }
  }
}
