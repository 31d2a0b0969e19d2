//! JSON API handlers.
//!
//! Every handler is generic over the [`SocialStore`] backend and takes the
//! shared [`AppState`](crate::AppState).

pub mod accounts;
pub mod chat;
pub mod content;
pub mod engagement;
pub mod followups;
pub mod presence;
pub mod profile;

use serde::Deserialize;
use vidcast_core::store::SocialStore;

use crate::error::Error;

/// `?offset=` pagination parameter.
#[derive(Debug, Default, Deserialize)]
pub struct Page {
  #[serde(default)]
  pub offset: usize,
}

/// Box a backend error into [`Error::Store`].
pub(crate) fn store_err<S: SocialStore>(e: S::Error) -> Error { Error::Store(Box::new(e)) }
