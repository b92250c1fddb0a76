//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::{InputFlags, MatchHandle, SessionId};
use crate::matchmaking::JoinedMatch;
use crate::util::rate_limit::PlayerRateLimiter;
use crate::util::time::unix_millis;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Outbound queue depth per connection
const OUTBOUND_CAPACITY: usize = 64;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session = SessionId::new();
    info!(session = %session, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();
    let (out_tx, out_rx) = mpsc::channel::<ServerMsg>(OUTBOUND_CAPACITY);

    let writer_handle = tokio::spawn(write_loop(session, ws_sink, out_rx));

    let welcome = ServerMsg::Welcome {
        session_id: session,
        server_time: unix_millis(),
    };
    if out_tx.send(welcome).await.is_err() {
        error!(session = %session, "Failed to queue welcome");
        writer_handle.abort();
        return;
    }

    // Cleanup on disconnect
    if let Some(seat) = run_session(session, &state, ws_stream, &out_tx).await {
        seat.release(session, &state).await;
    }
    writer_handle.abort();

    info!(session = %session, "WebSocket connection closed");
}

/// A session's current match plus the task forwarding its broadcasts
struct Seat {
    handle: MatchHandle,
    forwarder: JoinHandle<()>,
}

impl Seat {
    async fn release(self, session: SessionId, state: &AppState) {
        self.forwarder.abort();
        state.matchmaking.leave(session, &self.handle).await;
    }
}

/// Read client messages until the socket closes. Returns the seat still held.
async fn run_session(
    session: SessionId,
    state: &AppState,
    mut ws_stream: SplitStream<WebSocket>,
    out_tx: &mpsc::Sender<ServerMsg>,
) -> Option<Seat> {
    let rate_limiter = PlayerRateLimiter::new();
    let mut seat: Option<Seat> = None;

    while let Some(result) = ws_stream.next().await {
        let text = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(_)) => {
                warn!(session = %session, "Received binary message, ignoring");
                continue;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => {
                info!(session = %session, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(session = %session, error = %e, "WebSocket error");
                break;
            }
        };

        if !rate_limiter.check_input() {
            warn!(session = %session, "Rate limited input message");
            continue;
        }

        let client_msg = match serde_json::from_str::<ClientMsg>(&text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(session = %session, error = %e, "Failed to parse client message");
                continue;
            }
        };

        match client_msg {
            ClientMsg::Join { color, time_limit } => {
                if seat.as_ref().is_some_and(|s| !s.handle.is_closed()) {
                    let _ = out_tx.send(error_msg("already_joined", "Leave the current match first")).await;
                    continue;
                }
                if let Some(stale) = seat.take() {
                    stale.forwarder.abort();
                }

                match state.matchmaking.join(session, color, time_limit).await {
                    Ok(joined) => {
                        let _ = out_tx
                            .send(ServerMsg::RoleAssigned {
                                match_id: joined.handle.id,
                                role: joined.role,
                            })
                            .await;
                        seat = Some(seat_for(session, joined, out_tx.clone()));
                    }
                    Err(e) => {
                        warn!(session = %session, error = %e, "Join rejected");
                        let _ = out_tx.send(error_msg(e.code(), &e.to_string())).await;
                    }
                }
            }
            ClientMsg::Input {
                left,
                right,
                jump,
                down,
            } => {
                let Some(current) = seat.as_ref() else {
                    debug!(session = %session, "Input without a match");
                    continue;
                };
                let input = InputFlags {
                    left,
                    right,
                    jump,
                    down,
                };
                if !current.handle.set_input(session, input).await {
                    debug!(session = %session, "Input after match closed");
                }
            }
            ClientMsg::Ping { t } => {
                let _ = out_tx.send(ServerMsg::Pong { t }).await;
            }
            ClientMsg::Leave => {
                if let Some(current) = seat.take() {
                    current.release(session, state).await;
                }
            }
        }
    }

    seat
}

/// Start forwarding match broadcasts to this connection
fn seat_for(session: SessionId, joined: JoinedMatch, out_tx: mpsc::Sender<ServerMsg>) -> Seat {
    let JoinedMatch {
        handle, mut updates, ..
    } = joined;

    let forwarder = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(msg) => {
                    if out_tx.send(msg).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(session = %session, lagged_count = n, "Client lagged, skipping {} messages", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(session = %session, "Match channel closed");
                    break;
                }
            }
        }
    });

    Seat { handle, forwarder }
}

/// Drain the outbound queue into the socket
async fn write_loop(
    session: SessionId,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut out_rx: mpsc::Receiver<ServerMsg>,
) {
    while let Some(msg) = out_rx.recv().await {
        if let Err(e) = send_msg(&mut ws_sink, &msg).await {
            debug!(session = %session, error = %e, "WebSocket send failed");
            break;
        }
    }
}

fn error_msg(code: &str, message: &str) -> ServerMsg {
    ServerMsg::Error {
        code: code.to_string(),
        message: message.to_string(),
    }
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
