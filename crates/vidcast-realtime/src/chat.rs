//! Chat connection registry: many live connections per account.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use vidcast_core::{
  AccountId,
  message::{ChatDelivery, PrivateMessage},
};

use crate::{ConnId, Connection};

/// Account → every chat connection currently open for it, in registration
/// order.
///
/// Mutations lock only the affected account's shard, so different accounts
/// register and disconnect in parallel. An account key never maps to an
/// empty list.
#[derive(Debug, Default)]
pub struct ChatRegistry {
  connections: DashMap<AccountId, Vec<Connection>>,
}

impl ChatRegistry {
  pub fn new() -> Self { Self::default() }

  pub fn register(&self, account: AccountId, conn: Connection) {
    tracing::debug!(%account, conn = %conn.id(), "chat connection registered");
    self.connections.entry(account).or_default().push(conn);
  }

  /// Remove one connection. Drops the account key once its last connection
  /// is gone. Returns whether anything was removed.
  pub fn unregister(&self, account: AccountId, conn: ConnId) -> bool {
    match self.connections.entry(account) {
      Entry::Occupied(mut entry) => {
        let list   = entry.get_mut();
        let before = list.len();
        list.retain(|c| c.id() != conn);
        let removed = list.len() != before;
        if list.is_empty() {
          entry.remove();
        }
        removed
      }
      Entry::Vacant(_) => false,
    }
  }

  /// Queue `frame` on every connection of `account`. Connections whose writer
  /// has gone away are skipped. Returns how many accepted the frame.
  pub fn send_to(&self, account: AccountId, frame: &str) -> usize {
    let Some(list) = self.connections.get(&account) else {
      return 0;
    };
    let mut delivered = 0;
    for conn in list.iter() {
      if conn.send(frame) {
        delivered += 1;
      } else {
        tracing::debug!(%account, conn = %conn.id(), "skipping closed chat connection");
      }
    }
    delivered
  }

  /// Push a stored message to both participants' open chat connections.
  pub fn deliver(&self, message: &PrivateMessage) -> vidcast_core::Result<usize> {
    let frame = ChatDelivery::from(message).to_text()?;
    let mut delivered = self.send_to(message.sender_id, &frame);
    if message.recipient_id != message.sender_id {
      delivered += self.send_to(message.recipient_id, &frame);
    }
    Ok(delivered)
  }

  pub fn connection_count(&self, account: AccountId) -> usize {
    self.connections.get(&account).map_or(0, |list| list.len())
  }

  pub fn is_registered(&self, account: AccountId) -> bool {
    self.connections.contains_key(&account)
  }

  /// Number of accounts with at least one open chat connection.
  pub fn account_count(&self) -> usize { self.connections.len() }
}

/// Unregisters a chat connection when dropped.
///
/// Held by the connection's handler for its whole lifetime, so cleanup runs
/// exactly once however the handler exits (clean close, transport error,
/// panic or cancellation).
pub struct ChatGuard {
  registry: Arc<ChatRegistry>,
  account:  AccountId,
  conn:     ConnId,
}

impl ChatGuard {
  /// Register `conn` and return the guard that will remove it.
  pub fn register(registry: Arc<ChatRegistry>, account: AccountId, conn: Connection) -> Self {
    let id = conn.id();
    registry.register(account, conn);
    Self { registry, account, conn: id }
  }
}

impl Drop for ChatGuard {
  fn drop(&mut self) {
    self.registry.unregister(self.account, self.conn);
    tracing::debug!(account = %self.account, conn = %self.conn, "chat connection closed");
  }
}
