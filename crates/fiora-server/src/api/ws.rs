//! WebSocket endpoint for real-time workflow updates.
//!
//! Every connection is registered with the progress broadcaster; workflow
//! events are pushed as JSON text frames. Inbound frames support a small
//! client protocol: `{"type":"ping"}` → pong, `{"type":"subscribe"}` →
//! subscription ack. Anything else is ignored.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};

use fiora_core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (subscriber_id, mut events) = state.broadcaster.subscribe().await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    tracing::debug!(subscriber = %subscriber_id, "websocket connected");

    loop {
        tokio::select! {
            // Progress events (server -> client)
            event = events.recv() => {
                match event {
                    Some(payload) => {
                        if ws_tx.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // Client protocol messages (client -> server)
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_client_message(&text) {
                            if ws_tx.send(Message::Text(reply.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(subscriber = %subscriber_id, "websocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    state.broadcaster.unsubscribe(&subscriber_id).await;
    tracing::debug!(subscriber = %subscriber_id, "websocket disconnected");
}

fn handle_client_message(text: &str) -> Option<String> {
    let message: serde_json::Value = serde_json::from_str(text).ok()?;
    match message.get("type").and_then(|t| t.as_str()) {
        Some("ping") => Some(serde_json::json!({ "type": "pong" }).to_string()),
        Some("subscribe") => Some(
            serde_json::json!({
                "type": "subscribed",
                "message": "Connected to real-time updates",
            })
            .to_string(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_gets_pong() {
        let reply = handle_client_message(r#"{"type":"ping"}"#).unwrap();
        let json: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(json["type"], "pong");
    }

    #[test]
    fn test_subscribe_gets_ack() {
        let reply = handle_client_message(r#"{"type":"subscribe"}"#).unwrap();
        let json: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(json["type"], "subscribed");
    }

    #[test]
    fn test_unknown_and_invalid_messages_are_ignored() {
        assert!(handle_client_message(r#"{"type":"noise"}"#).is_none());
        assert!(handle_client_message("not json").is_none());
    }
}
