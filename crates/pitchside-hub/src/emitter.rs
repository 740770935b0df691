use std::sync::Arc;

use pitchside_core::types::SubjectId;
use pitchside_protocol::envelope::{Envelope, MatchEventType};
use serde_json::Value;
use tracing::debug;

use crate::hub::Hub;

/// Key inside a goal payload that holds the score after the goal.
pub const GOAL_SCORE_FIELD: &str = "currentScore";

/// Typed entry points the CRUD layer calls after committing a mutation.
///
/// Each call builds one envelope and hands it to the hub. Payloads are
/// passed through untouched, and nothing is reported back to the caller:
/// whether anyone was listening is the hub's business.
#[derive(Clone)]
pub struct Emitter {
    hub: Arc<Hub>,
}

impl Emitter {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    pub fn emit_match_event(
        &self,
        match_id: impl Into<SubjectId>,
        event_type: MatchEventType,
        data: Value,
    ) {
        self.send(Envelope::match_event(match_id.into(), event_type, data));
    }

    /// Goal: a `match_event` followed by a `score_update` carrying the
    /// payload's `currentScore` (null when absent).
    ///
    /// The two publishes are independent; a viewer can see the first
    /// without the second.
    pub fn emit_goal(&self, match_id: impl Into<SubjectId>, data: Value) {
        let match_id = match_id.into();
        let score = data.get(GOAL_SCORE_FIELD).cloned().unwrap_or(Value::Null);
        self.send(Envelope::match_event(match_id.clone(), MatchEventType::Goal, data));
        self.send(Envelope::score_update(match_id, score));
    }

    pub fn emit_card(&self, match_id: impl Into<SubjectId>, data: Value) {
        self.emit_match_event(match_id, MatchEventType::Card, data);
    }

    pub fn emit_substitution(&self, match_id: impl Into<SubjectId>, data: Value) {
        self.emit_match_event(match_id, MatchEventType::Substitution, data);
    }

    pub fn emit_score_update(&self, match_id: impl Into<SubjectId>, score: Value) {
        self.send(Envelope::score_update(match_id.into(), score));
    }

    pub fn emit_match_status_change(&self, match_id: impl Into<SubjectId>, status: Value) {
        self.send(Envelope::match_status_change(match_id.into(), status));
    }

    pub fn emit_statistics_update(&self, match_id: impl Into<SubjectId>, statistics: Value) {
        self.send(Envelope::statistics_update(match_id.into(), statistics));
    }

    pub fn emit_league_table_update(&self, league_id: impl Into<SubjectId>, standings: Value) {
        self.send(Envelope::league_table_update(league_id.into(), standings));
    }

    /// Sitewide: every connected viewer gets the story.
    pub fn broadcast_news(&self, news: Value) {
        self.send(Envelope::new_news(news));
    }

    fn send(&self, envelope: Envelope) {
        let delivered = self.hub.dispatch(&envelope);
        debug!(
            event = envelope.kind().as_str(),
            subject = ?envelope.subject_id().map(|id| id.to_string()),
            delivered,
            "event emitted"
        );
    }
}
