//! Core types and trait definitions for the Vidcast backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it: storage backends implement
//! [`store::SocialStore`], the realtime and server layers consume it through
//! the query and policy functions in [`graph`] and [`engagement`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod channel;
pub mod content;
pub mod engagement;
pub mod error;
pub mod graph;
pub mod id;
pub mod message;
pub mod store;

pub use error::{Error, Result};
pub use id::{AccountId, CommentId, FollowUpId, MessageId, VideoId};
