//! HTTP and WebSocket surface for Vidcast.
//!
//! Exposes an axum [`Router`] backed by any [`SocialStore`], plus the chat and
//! presence registries shared by every connection.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod ws;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use vidcast_core::store::SocialStore;
use vidcast_realtime::{ChatRegistry, Presence, PresenceRegistry};

use handlers::{accounts, chat, content, engagement, followups, presence, profile};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `VIDCAST_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  pub session_ttl_hours: i64,
  pub secure_cookies:    bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "127.0.0.1".to_string(),
      port:              8080,
      store_path:        PathBuf::from("~/.local/share/vidcast/vidcast.db"),
      session_ttl_hours: 24 * 30,
      secure_cookies:    false,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  pub chat:     Arc<ChatRegistry>,
  pub presence: Presence<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      config:   self.config.clone(),
      chat:     self.chat.clone(),
      presence: self.presence.clone(),
    }
  }
}

impl<S> AppState<S>
where
  S: SocialStore + 'static,
{
  /// Build state with fresh, empty connection registries.
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let presence = Presence::new(store.clone(), Arc::new(PresenceRegistry::new()));
    Self {
      store,
      config: Arc::new(config),
      chat: Arc::new(ChatRegistry::new()),
      presence,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the whole API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SocialStore + 'static,
{
  Router::new()
    // Accounts
    .route("/api/register",                post(accounts::register::<S>))
    .route("/api/login",                   post(accounts::login::<S>))
    .route("/api/logout",                  post(accounts::logout::<S>))
    .route("/api/settings/privacy",        post(accounts::set_privacy::<S>))
    .route(
      "/api/settings/profile",
      get(profile::profile_data::<S>).post(profile::update_profile::<S>),
    )
    .route("/api/home",                    get(profile::home::<S>))
    .route("/api/profile/{username}",      get(profile::profile::<S>))
    // Content
    .route("/api/videos",                  post(content::create_video::<S>))
    .route(
      "/api/videos/{id}",
      get(content::get_video::<S>).put(content::edit_video::<S>),
    )
    .route(
      "/api/videos/{id}/comments",
      get(content::list_comments::<S>).post(content::post_comment::<S>),
    )
    // Engagement
    .route("/api/videos/{id}/like",        post(engagement::like_video::<S>))
    .route("/api/videos/{id}/dislike",     post(engagement::dislike_video::<S>))
    .route("/api/comments/{id}/like",      post(engagement::like_comment::<S>))
    .route("/api/comments/{id}/dislike",   post(engagement::dislike_comment::<S>))
    .route("/api/accounts/{id}/subscribe", post(engagement::subscribe::<S>))
    // Follow-up requests
    .route("/api/followups",               get(followups::pending::<S>))
    .route("/api/followups/{id}/accept",   post(followups::accept::<S>))
    .route("/api/followups/{id}/deny",     post(followups::deny::<S>))
    // Chat
    .route("/api/chats",                   get(chat::contacts::<S>))
    .route("/api/chats/{id}",              get(chat::history::<S>).post(chat::send::<S>))
    .route("/api/chats/{id}/contact",      get(chat::contact::<S>))
    // Presence
    .route("/api/presence",                post(presence::heartbeat::<S>))
    // Sockets
    .route("/ws/chat",                     get(ws::chat::<S>))
    .route("/ws/presence",                 get(ws::presence::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
