//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by a handler, rendered as `{"error": message}`.
#[derive(Debug, Error)]
pub enum Error {
  #[error("authentication required")]
  Unauthorized,

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::Forbidden(_) => StatusCode::FORBIDDEN,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      Error::Conflict(_) => StatusCode::CONFLICT,
      Error::Internal(_) | Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<vidcast_core::Error> for Error {
  fn from(err: vidcast_core::Error) -> Self {
    use vidcast_core::Error as Core;
    match err {
      Core::AccountNotFound(_)
      | Core::VideoNotFound(_)
      | Core::CommentNotFound(_)
      | Core::FollowUpNotFound(_) => Error::NotFound(err.to_string()),
      Core::SelfAction | Core::Invalid(_) => Error::BadRequest(err.to_string()),
      Core::Permission(msg) => Error::Forbidden(msg),
      Core::UsernameTaken(_) => Error::Conflict(err.to_string()),
      Core::Serialization(e) => Error::Internal(e.to_string()),
      Core::Store(e) => Error::Store(e),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use vidcast_core::{AccountId, FollowUpId};

  use super::*;

  #[test]
  fn core_errors_map_to_statuses() {
    let cases = [
      (vidcast_core::Error::AccountNotFound(AccountId(1)), StatusCode::NOT_FOUND),
      (vidcast_core::Error::FollowUpNotFound(FollowUpId(2)), StatusCode::NOT_FOUND),
      (vidcast_core::Error::SelfAction, StatusCode::BAD_REQUEST),
      (vidcast_core::Error::Permission("private".into()), StatusCode::FORBIDDEN),
      (vidcast_core::Error::Invalid("bad".into()), StatusCode::BAD_REQUEST),
      (vidcast_core::Error::UsernameTaken("bob".into()), StatusCode::CONFLICT),
    ];
    for (core, status) in cases {
      assert_eq!(Error::from(core).status(), status);
    }
  }

  #[tokio::test]
  async fn body_is_json_error_object() {
    let resp = Error::Forbidden("this account is private".into()).into_response();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "this account is private" }));
  }
}
