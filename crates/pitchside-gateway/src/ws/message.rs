use pitchside_core::types::ConnId;
use pitchside_hub::{Hub, Outbound};
use pitchside_protocol::frames::{ClientRequest, MatchAck};
use tracing::{debug, warn};

use crate::ws::connection::ConnState;
use crate::ws::send;

/// Process one inbound WS text frame. Returns the new connection state.
///
/// Malformed frames are logged and ignored without a reply.
pub fn handle(conn_id: &ConnId, text: &str, tx: &Outbound, hub: &Hub) -> ConnState {
    let req = match ClientRequest::parse(text) {
        Ok(req) => req,
        Err(e) => {
            warn!(conn_id = %conn_id, error = %e, "malformed frame ignored");
            return ConnState::Open;
        }
    };

    match req {
        ClientRequest::JoinMatch(ref match_id) => {
            if let Some(room) = req.room() {
                if hub.join(conn_id, room) {
                    send::queue_json(tx, &MatchAck::joined(match_id));
                }
            }
        }
        ClientRequest::LeaveMatch(ref match_id) => {
            if let Some(room) = req.room() {
                hub.leave(conn_id, &room);
                send::queue_json(tx, &MatchAck::left(match_id));
            }
        }
        ClientRequest::JoinLeague(_) => {
            if let Some(room) = req.room() {
                hub.join(conn_id, room);
            }
        }
        ClientRequest::LeaveLeague(_) => {
            if let Some(room) = req.room() {
                hub.leave(conn_id, &room);
            }
        }
        ClientRequest::Disconnect => {
            debug!(conn_id = %conn_id, "client requested disconnect");
            return ConnState::Closing;
        }
    }

    ConnState::Open
}
