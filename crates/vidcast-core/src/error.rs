//! Error types for `vidcast-core`.

use thiserror::Error;

use crate::{AccountId, CommentId, FollowUpId, VideoId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("account not found: {0}")]
  AccountNotFound(AccountId),

  #[error("video not found: {0}")]
  VideoNotFound(VideoId),

  #[error("comment not found: {0}")]
  CommentNotFound(CommentId),

  #[error("follow-up request not found: {0}")]
  FollowUpNotFound(FollowUpId),

  /// The actor tried to subscribe to (or otherwise target) themselves.
  #[error("an account cannot target itself")]
  SelfAction,

  /// The actor is not allowed to see or act on the requested resource.
  #[error("permission denied: {0}")]
  Permission(String),

  #[error("username already taken: {0}")]
  UsernameTaken(String),

  #[error("invalid request: {0}")]
  Invalid(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error into [`Error::Store`].
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
