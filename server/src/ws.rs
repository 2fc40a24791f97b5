use crate::game_manager::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use shared::{ClientMessage, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Forward engine messages to the socket
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(err) => {
                    tracing::error!(error = %err, "Failed to encode server message");
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let player_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(player_id = %player_id, "Player connected");
    state.add_player(player_id.clone(), tx);

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => state.dispatch(&player_id, client_msg).await,
                Err(err) => {
                    tracing::warn!(player_id = %player_id, error = %err, "Ignoring malformed message");
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    tracing::info!(player_id = %player_id, "Player disconnected");
    state.remove_player(&player_id).await;
    writer.abort();
}
