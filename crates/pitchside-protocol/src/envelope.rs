use chrono::{DateTime, SecondsFormat, Utc};
use pitchside_core::types::{RoomKey, SubjectId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::events;
use crate::frames::EventFrame;

/// Outbound broadcast kind. Serialized names are the socket event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    MatchEvent,
    ScoreUpdate,
    MatchStatusChange,
    StatisticsUpdate,
    LeagueTableUpdate,
    NewNews,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::MatchEvent => events::MATCH_EVENT,
            EventKind::ScoreUpdate => events::SCORE_UPDATE,
            EventKind::MatchStatusChange => events::MATCH_STATUS_CHANGE,
            EventKind::StatisticsUpdate => events::STATISTICS_UPDATE,
            EventKind::LeagueTableUpdate => events::LEAGUE_TABLE_UPDATE,
            EventKind::NewNews => events::NEW_NEWS,
        }
    }
}

/// Sub-type carried by `match_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchEventType {
    Goal,
    Card,
    Substitution,
}

/// Match lifecycle values as the CRUD layer stores them.
///
/// The broadcast layer never inspects status; this type only exists so
/// callers can build status payloads without stringly-typed literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Halftime,
    Finished,
    Postponed,
    Cancelled,
}

/// Kind-specific envelope content. Domain objects stay opaque JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum EventBody {
    MatchEvent { event_type: MatchEventType, data: Value },
    ScoreUpdate { score: Value },
    MatchStatusChange { status: Value },
    StatisticsUpdate { statistics: Value },
    LeagueTableUpdate { standings: Value },
    NewNews { news: Value },
}

impl EventBody {
    pub fn kind(&self) -> EventKind {
        match self {
            EventBody::MatchEvent { .. } => EventKind::MatchEvent,
            EventBody::ScoreUpdate { .. } => EventKind::ScoreUpdate,
            EventBody::MatchStatusChange { .. } => EventKind::MatchStatusChange,
            EventBody::StatisticsUpdate { .. } => EventKind::StatisticsUpdate,
            EventBody::LeagueTableUpdate { .. } => EventKind::LeagueTableUpdate,
            EventBody::NewNews { .. } => EventKind::NewNews,
        }
    }
}

/// Immutable event record handed to the hub for delivery.
///
/// Built once per emit and dropped after fan-out; nothing keeps envelopes
/// around for replay.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    subject_id: Option<SubjectId>,
    body: EventBody,
    timestamp: DateTime<Utc>,
}

impl Envelope {
    fn new(subject_id: Option<SubjectId>, body: EventBody) -> Self {
        Self {
            subject_id,
            body,
            timestamp: Utc::now(),
        }
    }

    pub fn match_event(match_id: SubjectId, event_type: MatchEventType, data: Value) -> Self {
        Self::new(Some(match_id), EventBody::MatchEvent { event_type, data })
    }

    pub fn score_update(match_id: SubjectId, score: Value) -> Self {
        Self::new(Some(match_id), EventBody::ScoreUpdate { score })
    }

    pub fn match_status_change(match_id: SubjectId, status: Value) -> Self {
        Self::new(Some(match_id), EventBody::MatchStatusChange { status })
    }

    pub fn statistics_update(match_id: SubjectId, statistics: Value) -> Self {
        Self::new(Some(match_id), EventBody::StatisticsUpdate { statistics })
    }

    pub fn league_table_update(league_id: SubjectId, standings: Value) -> Self {
        Self::new(Some(league_id), EventBody::LeagueTableUpdate { standings })
    }

    pub fn new_news(news: Value) -> Self {
        Self::new(None, EventBody::NewNews { news })
    }

    /// Override the construction time (replays in tests, clock-skew fixes).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn kind(&self) -> EventKind {
        self.body.kind()
    }

    pub fn subject_id(&self) -> Option<&SubjectId> {
        self.subject_id.as_ref()
    }

    pub fn body(&self) -> &EventBody {
        &self.body
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Room this envelope belongs to. `None` for global broadcasts.
    pub fn room(&self) -> Option<RoomKey> {
        let id = self.subject_id.as_ref()?;
        match self.kind() {
            EventKind::LeagueTableUpdate => Some(RoomKey::for_league(id)),
            EventKind::NewNews => None,
            _ => Some(RoomKey::for_match(id)),
        }
    }

    /// Flat JSON payload as viewers receive it, e.g.
    /// `{ "matchId": 7, "score": {...}, "timestamp": "2025-03-01T15:04:05.000Z" }`.
    pub fn wire_payload(&self) -> Value {
        let mut map = Map::new();

        if let Some(id) = &self.subject_id {
            let key = match self.kind() {
                EventKind::LeagueTableUpdate => "leagueId",
                _ => "matchId",
            };
            map.insert(key.to_string(), serde_json::to_value(id).unwrap_or(Value::Null));
        }

        match &self.body {
            EventBody::MatchEvent { event_type, data } => {
                map.insert(
                    "eventType".to_string(),
                    serde_json::to_value(event_type).unwrap_or(Value::Null),
                );
                map.insert("data".to_string(), data.clone());
            }
            EventBody::ScoreUpdate { score } => {
                map.insert("score".to_string(), score.clone());
            }
            EventBody::MatchStatusChange { status } => {
                map.insert("status".to_string(), status.clone());
            }
            EventBody::StatisticsUpdate { statistics } => {
                map.insert("statistics".to_string(), statistics.clone());
            }
            EventBody::LeagueTableUpdate { standings } => {
                map.insert("standings".to_string(), standings.clone());
            }
            EventBody::NewNews { news } => {
                map.insert("news".to_string(), news.clone());
            }
        }

        map.insert(
            "timestamp".to_string(),
            Value::String(self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        Value::Object(map)
    }

    pub fn to_frame(&self) -> EventFrame {
        EventFrame::new(self.kind().as_str(), self.wire_payload())
    }
}
