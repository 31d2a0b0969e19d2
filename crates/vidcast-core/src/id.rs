//! Integer identifiers for persisted entities.
//!
//! Every id is a transparent newtype over the `INTEGER PRIMARY KEY` the store
//! assigns, so it serialises as a bare JSON number (the wire contract with
//! clients uses plain integers).

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
    }

    impl From<i64> for $name {
      fn from(raw: i64) -> Self { Self(raw) }
    }
  };
}

id_type!(
  /// Identifies an account (a user, which is also a channel).
  AccountId
);
id_type!(VideoId);
id_type!(CommentId);
id_type!(
  /// Identifies a pending follow-up request.
  FollowUpId
);
id_type!(MessageId);
