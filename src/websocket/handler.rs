use std::sync::Arc;
use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

use crate::models::{ClientMessage, ErrorResponse};
use crate::utils::ScopeGuard;
use crate::ws::RoomSession;
use crate::AppState;

/// Upgrade gateway for the shared room
pub async fn shared_room_gateway(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    // Without an upgrade header the request never reaches the room
    if !is_upgrade_request(&headers) {
        return ErrorResponse::reply(StatusCode::UPGRADE_REQUIRED, "Expected WebSocket upgrade request")
            .into_response();
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!("Rejected WebSocket upgrade: {}", rejection);
            return rejection.into_response();
        }
    };

    info!("New WebSocket connection attempt");
    let room_id = app_state.config.room_id.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, room_id, app_state))
}

fn is_upgrade_request(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("websocket"))
        .unwrap_or(false)
}

/// Pump one upgraded socket: coordinator frames out, client intents in.
async fn handle_socket(socket: WebSocket, room_id: String, app_state: Arc<AppState>) {
    let RoomSession { id, handle, mut outbound } = match app_state.rooms.join(&room_id).await {
        Ok(session) => session,
        Err(e) => {
            error!("Could not join room {}: {}", room_id, e);
            return;
        }
    };
    // Exactly one leave for the session, however the socket ends
    let leave_handle = handle.clone();
    let _leave = ScopeGuard::new(move || leave_handle.leave(id));

    info!("WebSocket connection established for room {} with session {}", room_id, id);
    let (mut sender, mut receiver) = socket.split();

    // Forward coordinator frames to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if sender.send(Message::Text(frame.to_string())).await.is_err() {
                break;
            }
        }
    });

    // Decode client frames into intents
    let intents = handle.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => match ClientMessage::parse(&text) {
                    Some(message) => {
                        if intents.submit(id, message.into()).is_err() {
                            break;
                        }
                    }
                    None => debug!("Ignoring malformed frame from session {}", id),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!("WebSocket error for session {}: {}", id, e);
                    break;
                }
            }
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };
    info!("WebSocket connection terminated for session {}", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn upgrade_header_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        assert!(!is_upgrade_request(&headers));

        headers.insert(header::UPGRADE, HeaderValue::from_static("WebSocket"));
        assert!(is_upgrade_request(&headers));

        headers.insert(header::UPGRADE, HeaderValue::from_static("h2c"));
        assert!(!is_upgrade_request(&headers));
    }
}
