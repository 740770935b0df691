//! Room diagnostics — GET /rooms and GET /rooms/{room}.
//!
//! Read-only views of hub membership for operators. Unknown rooms report
//! size 0 rather than 404: an empty room and an absent room are the same.

use axum::{
    extract::{Path, State},
    Json,
};
use pitchside_core::types::RoomKey;
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct RoomSize {
    pub room: String,
    pub size: usize,
}

#[derive(Debug, Serialize)]
pub struct RoomList {
    pub rooms: Vec<RoomSize>,
}

/// GET /rooms — every non-empty room, sorted by key.
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<RoomList> {
    let rooms = state
        .hub
        .rooms()
        .into_iter()
        .map(|(room, size)| RoomSize {
            room: room.0,
            size,
        })
        .collect();
    Json(RoomList { rooms })
}

/// GET /rooms/{room} — subscriber count for one room key.
pub async fn room_size(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> Json<RoomSize> {
    let size = state.hub.room_size(&RoomKey::from(room.as_str()));
    Json(RoomSize { room, size })
}
