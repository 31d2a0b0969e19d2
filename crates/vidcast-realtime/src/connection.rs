//! Handles to live duplex connections.

use std::fmt;

use tokio::sync::mpsc;
use uuid::Uuid;

/// Unique id of one transport connection (one socket, one browser tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(Uuid);

impl ConnId {
  fn new() -> Self { Self(Uuid::new_v4()) }
}

impl fmt::Display for ConnId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Why the server ended a connection on its own initiative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
  /// A newer connection for the same account took over the registry slot.
  Superseded,
}

impl CloseReason {
  /// Application close code (the 4000-4999 range is reserved for
  /// applications by RFC 6455).
  pub fn code(self) -> u16 {
    match self {
      Self::Superseded => 4000,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Superseded => "superseded",
    }
  }
}

impl fmt::Display for CloseReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// One item queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
  Text(String),
  /// Send a close frame and stop writing.
  Close(CloseReason),
}

impl Frame {
  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(text) => Some(text),
      Self::Close(_) => None,
    }
  }
}

/// The outbound side of a live connection.
///
/// Cloning is cheap; every clone feeds the same writer task.
#[derive(Debug, Clone)]
pub struct Connection {
  id: ConnId,
  tx: mpsc::UnboundedSender<Frame>,
}

impl Connection {
  /// Create a connection handle and the receiver its writer task drains.
  pub fn open() -> (Self, mpsc::UnboundedReceiver<Frame>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { id: ConnId::new(), tx }, rx)
  }

  pub fn id(&self) -> ConnId { self.id }

  /// Queue a text frame. Returns `false` if the writer has gone away; the
  /// caller decides whether that matters, it is never an error.
  pub fn send(&self, frame: &str) -> bool {
    self.tx.send(Frame::Text(frame.to_owned())).is_ok()
  }

  /// Ask the writer to close the transport. Frames queued before this one
  /// are still written; anything sent afterwards is discarded.
  pub fn close(&self, reason: CloseReason) -> bool { self.tx.send(Frame::Close(reason)).is_ok() }

  pub fn is_closed(&self) -> bool { self.tx.is_closed() }
}
