//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::persistence::ReservoirStore;

/// `GET /ws/reservoirs`: Upgrade HTTP connection to WebSocket.
///
/// The viewer is registered only once the upgrade completes.
pub async fn ws_handler<S: ReservoirStore>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| run_connection(socket, hub.connect()))
}
