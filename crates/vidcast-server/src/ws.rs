//! WebSocket endpoints for chat delivery and presence.
//!
//! A socket is only registered after its session cookie verifies; otherwise
//! the upgrade completes and the server immediately closes with code 1008
//! (policy violation). Registered sockets are cleaned up by guards, so an
//! error or panic in the read loop still unregisters them.
//!
//! A presence socket replaced by a newer one for the same account is closed
//! with code 4000 and reason `superseded`.

use axum::{
  extract::{
    State,
    ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
  },
  response::Response,
};
use futures_util::{SinkExt as _, StreamExt as _};
use tokio::sync::mpsc::UnboundedReceiver;
use vidcast_core::{AccountId, store::SocialStore};
use vidcast_realtime::{ChatGuard, Connection, Frame};

use crate::{AppState, auth::Authentication};

/// `GET /ws/chat`
pub async fn chat<S>(
  State(state): State<AppState<S>>,
  auth: Authentication,
  ws: WebSocketUpgrade,
) -> Response
where
  S: SocialStore + 'static,
{
  ws.on_upgrade(move |socket| async move {
    match auth {
      Authentication::Authenticated { account_id } => run_chat(state, account_id, socket).await,
      Authentication::Unauthenticated => reject(socket).await,
    }
  })
}

/// `GET /ws/presence`
pub async fn presence<S>(
  State(state): State<AppState<S>>,
  auth: Authentication,
  ws: WebSocketUpgrade,
) -> Response
where
  S: SocialStore + 'static,
{
  ws.on_upgrade(move |socket| async move {
    match auth {
      Authentication::Authenticated { account_id } => {
        run_presence(state, account_id, socket).await
      }
      Authentication::Unauthenticated => reject(socket).await,
    }
  })
}

// ─── Lifecycles ──────────────────────────────────────────────────────────────

async fn run_chat<S>(state: AppState<S>, account: AccountId, socket: WebSocket)
where
  S: SocialStore + 'static,
{
  let (conn, rx) = Connection::open();
  tracing::info!(%account, conn = %conn.id(), "chat socket open");
  let _guard = ChatGuard::register(state.chat.clone(), account, conn);
  pump(socket, rx).await;
}

async fn run_presence<S>(state: AppState<S>, account: AccountId, mut socket: WebSocket)
where
  S: SocialStore + 'static,
{
  let (conn, rx) = Connection::open();
  let guard = match state.presence.connect(account, conn).await {
    Ok(guard) => guard,
    Err(e) => {
      tracing::warn!(%account, error = %e, "presence connect failed");
      close(&mut socket, close_code::ERROR, "presence unavailable").await;
      return;
    }
  };
  pump(socket, rx).await;
  guard.close().await;
}

/// Forward queued frames to the socket until either side goes away or the
/// server closes the connection.
///
/// Inbound frames carry no meaning on these endpoints; they are read only to
/// notice the client disconnecting.
async fn pump(socket: WebSocket, mut rx: UnboundedReceiver<Frame>) {
  let (mut sink, mut stream) = socket.split();

  let mut writer = tokio::spawn(async move {
    while let Some(frame) = rx.recv().await {
      let message = match frame {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Close(reason) => {
          tracing::debug!(%reason, "closing socket");
          let frame = CloseFrame { code: reason.code(), reason: reason.as_str().into() };
          if let Err(e) = sink.send(Message::Close(Some(frame))).await {
            tracing::debug!(error = %e, "failed to send close frame");
          }
          break;
        }
      };
      if let Err(e) = sink.send(message).await {
        tracing::debug!(error = %e, "socket write failed");
        break;
      }
    }
  });

  let reader = async {
    while let Some(message) = stream.next().await {
      match message {
        Ok(Message::Close(_)) => break,
        Ok(_) => {}
        Err(e) => {
          tracing::debug!(error = %e, "socket read failed");
          break;
        }
      }
    }
  };

  tokio::select! {
    _ = &mut writer => {}
    _ = reader => {}
  }
  writer.abort();
}

async fn reject(mut socket: WebSocket) {
  tracing::debug!("rejecting unauthenticated socket");
  close(&mut socket, close_code::POLICY, "authentication required").await;
}

async fn close(socket: &mut WebSocket, code: u16, reason: &'static str) {
  let frame = CloseFrame { code, reason: reason.into() };
  if let Err(e) = socket.send(Message::Close(Some(frame))).await {
    tracing::debug!(error = %e, "failed to send close frame");
  }
}
