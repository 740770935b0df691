use axum::{
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use pitchside_core::config::MAX_PAYLOAD_BYTES;
use pitchside_core::error::PitchsideError;
use pitchside_core::types::ConnId;
use pitchside_protocol::{events, frames::EventFrame};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::app::AppState;
use crate::ws::message;

/// WS connection states — linear progression, no backwards transitions.
#[derive(Debug)]
pub enum ConnState {
    Open,
    Closing,
}

/// Axum handler — upgrades HTTP to WebSocket at GET /ws.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.max_message_size(MAX_PAYLOAD_BYTES)
        .on_upgrade(|socket| run_connection(socket, state))
}

/// Per-connection event loop — lives for the entire WS session.
///
/// Inbound frames mutate hub membership; everything bound for the viewer
/// (acks and broadcasts alike) arrives through the outbound queue and is
/// written here in order.
async fn run_connection(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = ConnId::new();
    let (mut sink, mut stream) = socket.split();

    let (tx, mut rx) = mpsc::channel::<String>(state.config.hub.outbound_buffer);
    state.hub.connect(conn_id.clone(), tx.clone());

    let mut tick = heartbeat(state.config.hub.heartbeat_secs);

    loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > MAX_PAYLOAD_BYTES {
                            let err = PitchsideError::PayloadTooLarge {
                                size: text.len(),
                                max: MAX_PAYLOAD_BYTES,
                            };
                            warn!(conn_id = %conn_id, code = err.code(), "{}", err);
                            break;
                        }
                        let next = message::handle(&conn_id, text.as_str(), &tx, &state.hub);
                        if matches!(next, ConnState::Closing) { break; }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sink.send(Message::Pong(data)).await.is_err() { break; }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(conn_id = %conn_id, error = %e, "WS transport error");
                        break;
                    }
                    _ => {}
                }
            }

            frame = rx.recv() => {
                // tx is held above, so the queue never closes while we loop
                let Some(frame) = frame else { break };
                if sink.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }

            _ = next_tick(&mut tick) => {
                let ev = EventFrame::new(
                    events::TICK,
                    serde_json::json!({ "ts": chrono::Utc::now().timestamp_millis() }),
                ).with_seq(state.hub.next_seq());
                let Ok(json) = serde_json::to_string(&ev) else { continue };
                if sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    let rooms = state.hub.disconnect(&conn_id);
    let _ = sink.close().await;
    info!(conn_id = %conn_id, rooms, "WS connection closed");
}

fn heartbeat(secs: u64) -> Option<Interval> {
    if secs == 0 {
        return None;
    }
    let period = Duration::from_secs(secs);
    // first tick one period after connect, not immediately
    let mut tick = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    Some(tick)
}

async fn next_tick(tick: &mut Option<Interval>) {
    match tick {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
