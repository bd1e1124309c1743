//! WebSocket connection loop for one viewer.
//!
//! Forwards hub updates to the socket and reads client frames only to
//! notice keep-alives and disconnects.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::domain::Viewer;

/// Runs the read/write loop for a single viewer connection.
///
/// Ends when the client closes, the socket errors, a send fails, or the
/// hub drops the viewer. The [`Viewer`] is dropped on return, which
/// unregisters it.
pub async fn run_connection(socket: WebSocket, mut viewer: Viewer) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let viewer_id = viewer.id();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.as_str().trim().eq_ignore_ascii_case("ping")
                            && ws_tx.send(Message::text("pong")).await.is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(viewer = %viewer_id, error = %err, "ws receive failed");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
            update = viewer.recv() => {
                let Some(update) = update else {
                    tracing::debug!(viewer = %viewer_id, "viewer dropped by hub");
                    break;
                };
                let json = match serde_json::to_string(&update) {
                    Ok(json) => json,
                    Err(err) => {
                        tracing::warn!(viewer = %viewer_id, error = %err, "failed to encode update");
                        continue;
                    }
                };
                if ws_tx.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!(viewer = %viewer_id, "ws connection closed");
}
