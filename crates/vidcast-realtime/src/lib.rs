//! In-process connection registries and the presence broadcast protocol.
//!
//! Transport-agnostic: a [`Connection`] is the sending half of an unbounded
//! channel whose receiver is drained by the transport's writer task (the
//! WebSocket handlers in `vidcast-server`). Sending never blocks, so a slow or
//! dead peer cannot stall a broadcast to its siblings.
//!
//! Registries are explicit instances created at startup and shared by
//! handle; there is no global state. They are scoped to one process.

pub mod chat;
pub mod connection;
pub mod presence;

pub use chat::{ChatGuard, ChatRegistry};
pub use connection::{CloseReason, ConnId, Connection, Frame};
pub use presence::{Presence, PresenceGuard, PresenceRegistry};
