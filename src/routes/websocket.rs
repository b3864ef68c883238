use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    middleware::auth::decode_access_token,
    error::AppError,
    models::{auth::AuthenticatedUser, stats::WeeklyStats},
    AppState,
};

/// Frames a client may send.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    Authenticate { token: String },
}

/// Frames the server sends.
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum ServerEvent<'a> {
    Authenticated,
    Unauthorized { reason: String },
    MealSelectionUpdate(&'a WeeklyStats),
}

impl ServerEvent<'_> {
    fn to_message(&self) -> Message {
        let text = serde_json::to_string(self).unwrap_or_default();
        Message::Text(text.into())
    }
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut updates: Option<broadcast::Receiver<Arc<WeeklyStats>>> = None;
    debug!("WebSocket connected");

    loop {
        tokio::select! {
            update = next_update(&mut updates) => {
                match update {
                    Ok(stats) => {
                        let msg = ServerEvent::MealSelectionUpdate(&stats).to_message();
                        if sender.send(msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("admin session lagged, skipped {skipped} update(s)");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = receiver.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };

                let reply = match serde_json::from_str::<ClientEvent>(text.as_str()) {
                    Ok(ClientEvent::Authenticate { token }) => {
                        match authenticate(state.config.jwt_secret.as_deref(), &token) {
                            Ok(user) => match state.admin_broadcast.admit(&user) {
                                Some(rx) => {
                                    info!("User {} joined admin broadcast group", user.user_id);
                                    updates = Some(rx);
                                    ServerEvent::Authenticated
                                }
                                None => ServerEvent::Unauthorized { reason: "admin role required".into() },
                            },
                            Err(reason) => {
                                warn!("Socket authentication error: {reason}");
                                ServerEvent::Unauthorized { reason }
                            }
                        }
                    }
                    Err(e) => {
                        debug!("ignoring unrecognised socket frame: {e}");
                        continue;
                    }
                };

                if sender.send(reply.to_message()).await.is_err() {
                    break;
                }
            }
        }
    }

    debug!("WebSocket disconnected");
}

/// First capability check: the same token verification as the HTTP auth gate,
/// reporting the same rejection reasons.
fn authenticate(secret: Option<&str>, token: &str) -> Result<AuthenticatedUser, String> {
    let secret = secret.ok_or_else(|| AppError::ServerMisconfigured.to_string())?;
    decode_access_token(token, secret).map_err(|e| e.to_string())
}

/// Waits forever until the session has been admitted to the group.
async fn next_update(
    updates: &mut Option<broadcast::Receiver<Arc<WeeklyStats>>>,
) -> Result<Arc<WeeklyStats>, broadcast::error::RecvError> {
    match updates {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
