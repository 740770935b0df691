use pitchside_core::error::PitchsideError;
use pitchside_core::types::{RoomKey, SubjectId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events;

/// Server → Client push event.
/// Wire: `{ "type": "event", "event": "score_update", "payload": {...}, "seq": 42 }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

impl EventFrame {
    pub fn new(event: impl Into<String>, payload: impl Serialize) -> Self {
        Self {
            frame_type: "event".to_string(),
            event: event.into(),
            payload: Some(serde_json::to_value(payload).unwrap_or(Value::Null)),
            seq: None,
        }
    }

    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = Some(seq);
        self
    }
}

/// Client → Server frame.
/// Wire: `{ "event": "join_match", "payload": 12 }`
///
/// The payload is the bare match or league id, number or string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// A decoded viewer request.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    JoinMatch(SubjectId),
    LeaveMatch(SubjectId),
    JoinLeague(SubjectId),
    LeaveLeague(SubjectId),
    Disconnect,
}

impl ClientRequest {
    /// Decode raw socket text. Unknown events and missing or non-scalar ids
    /// are protocol errors; the caller decides whether to reply.
    pub fn parse(text: &str) -> Result<Self, PitchsideError> {
        let frame: ClientFrame = serde_json::from_str(text)?;
        Self::from_frame(&frame)
    }

    pub fn from_frame(frame: &ClientFrame) -> Result<Self, PitchsideError> {
        let subject = || -> Result<SubjectId, PitchsideError> {
            let value = frame.payload.as_ref().ok_or_else(|| {
                PitchsideError::Protocol(format!("{} requires an id payload", frame.event))
            })?;
            SubjectId::from_value(value)
        };

        match frame.event.as_str() {
            events::JOIN_MATCH => Ok(Self::JoinMatch(subject()?)),
            events::LEAVE_MATCH => Ok(Self::LeaveMatch(subject()?)),
            events::JOIN_LEAGUE => Ok(Self::JoinLeague(subject()?)),
            events::LEAVE_LEAGUE => Ok(Self::LeaveLeague(subject()?)),
            events::DISCONNECT => Ok(Self::Disconnect),
            other => Err(PitchsideError::Protocol(format!("unknown event: {}", other))),
        }
    }

    /// Room this request targets, if any.
    pub fn room(&self) -> Option<RoomKey> {
        match self {
            Self::JoinMatch(id) | Self::LeaveMatch(id) => Some(RoomKey::for_match(id)),
            Self::JoinLeague(id) | Self::LeaveLeague(id) => Some(RoomKey::for_league(id)),
            Self::Disconnect => None,
        }
    }
}

/// Payload of `joined_match` / `left_match` acknowledgements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAck {
    pub match_id: SubjectId,
    pub message: String,
}

impl MatchAck {
    pub fn joined(match_id: &SubjectId) -> EventFrame {
        EventFrame::new(
            events::JOINED_MATCH,
            MatchAck {
                match_id: match_id.clone(),
                message: format!("Joined match {}", match_id),
            },
        )
    }

    pub fn left(match_id: &SubjectId) -> EventFrame {
        EventFrame::new(
            events::LEFT_MATCH,
            MatchAck {
                match_id: match_id.clone(),
                message: format!("Left match {}", match_id),
            },
        )
    }
}
