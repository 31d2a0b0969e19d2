//! Accounts: users, who are also the channels other users subscribe to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, content::Video};

/// Maximum biography length, in characters, after trimming.
pub const MAX_BIOGRAPHY_CHARS: usize = 500;

/// A persisted account.
///
/// `subscriber_count` is denormalised: it always equals the number of inbound
/// subscription edges and is maintained by the same transaction that adds or
/// removes an edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
  pub account_id:       AccountId,
  pub username:         String,
  pub email:            String,
  /// PHC string; never serialised to clients.
  #[serde(skip_serializing, default)]
  pub password_hash:    String,
  pub biography:        Option<String>,
  pub subscriber_count: i64,
  pub private:          bool,
  pub online:           bool,
  pub last_active:      Option<DateTime<Utc>>,
  pub created_at:       DateTime<Utc>,
}

/// Input for [`SocialStore::create_account`](crate::store::SocialStore::create_account).
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
}

/// The public summary of an account shown in chat contact lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSummary {
  pub account_id:  AccountId,
  pub username:    String,
  pub online:      bool,
  pub last_active: Option<DateTime<Utc>>,
}

impl From<&Account> for ContactSummary {
  fn from(account: &Account) -> Self {
    Self {
      account_id:  account.account_id,
      username:    account.username.clone(),
      online:      account.online,
      last_active: account.last_active,
    }
  }
}

/// Input for [`SocialStore::update_profile`](crate::store::SocialStore::update_profile).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChanges {
  pub username:  String,
  pub biography: Option<String>,
}

impl ProfileChanges {
  /// Trim both fields. A blank biography clears it; a blank username is
  /// rejected.
  pub fn new(username: &str, biography: Option<&str>) -> crate::Result<Self> {
    let username = username.trim();
    if username.is_empty() {
      return Err(crate::Error::Invalid("username must not be empty".into()));
    }
    let biography = biography.map(str::trim).filter(|b| !b.is_empty());
    if biography.is_some_and(|b| b.chars().count() > MAX_BIOGRAPHY_CHARS) {
      return Err(crate::Error::Invalid(format!(
        "biography must be at most {MAX_BIOGRAPHY_CHARS} characters"
      )));
    }
    Ok(Self { username: username.to_owned(), biography: biography.map(str::to_owned) })
  }
}

/// Outcome of a profile update.
#[derive(Debug, Clone)]
pub enum ProfileUpdate {
  Updated(Account),
  /// Another account already holds the requested username.
  UsernameTaken,
}

/// A channel page as seen by a particular viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub account_id:       AccountId,
  pub username:         String,
  pub biography:        Option<String>,
  pub subscriber_count: i64,
  pub private:          bool,
  /// Whether the viewer may see this channel's content. When `false`,
  /// `videos` is empty.
  pub visible:          bool,
  pub videos:           Vec<Video>,
}

impl Profile {
  pub fn new(account: Account, visible: bool, videos: Vec<Video>) -> Self {
    Self {
      account_id: account.account_id,
      username: account.username,
      biography: account.biography,
      subscriber_count: account.subscriber_count,
      private: account.private,
      visible,
      videos,
    }
  }
}
