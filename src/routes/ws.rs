use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use std::sync::Arc;

use crate::player::actor::PlayerActor;
use crate::registry::actor_client::RoomRegistryClient;

/// Upgrades the connection; all room routing happens over the socket itself
/// through `createRoom` and `joinRoom` intents.
pub async fn connect_player_to_websocket(
    State(registry): State<Arc<RoomRegistryClient>>,
    websocket_upgrade: WebSocketUpgrade,
) -> Response {
    websocket_upgrade.on_upgrade(move |websocket| async move {
        PlayerActor::create(registry.as_ref().clone(), websocket).await
    })
}
