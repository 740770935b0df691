use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::error::PitchsideError;

/// Per-connection identifier (random UUID, not persisted).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnId(pub String);

impl ConnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConnId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A match or league id exactly as the caller supplied it.
///
/// Ids arrive either as JSON numbers (from the CRUD layer) or as strings
/// (from browser route params). The original shape is kept for payloads so
/// `leagueId: 3` round-trips as a number, while [`fmt::Display`] gives the
/// plain stringification used in room keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SubjectId {
    Number(serde_json::Number),
    Text(String),
}

impl SubjectId {
    /// Accept a JSON scalar id. Anything else (null, bool, array, object) is rejected.
    pub fn from_value(value: &Value) -> Result<Self, PitchsideError> {
        match value {
            Value::Number(n) => Ok(Self::Number(n.clone())),
            Value::String(s) => Ok(Self::Text(s.clone())),
            other => Err(PitchsideError::InvalidSubjectId(other.to_string())),
        }
    }
}

/// Largest integer an f64 holds exactly (2^53).
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectId::Number(n) if n.is_f64() => match n.as_f64() {
                // 12.0 names the same room as 12
                Some(x) if x.fract() == 0.0 && x.abs() <= MAX_EXACT_FLOAT_INT => {
                    write!(f, "{}", x as i64)
                }
                _ => write!(f, "{}", n),
            },
            SubjectId::Number(n) => write!(f, "{}", n),
            SubjectId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl<'de> Deserialize<'de> for SubjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        SubjectId::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl From<u64> for SubjectId {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for SubjectId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<u32> for SubjectId {
    fn from(n: u32) -> Self {
        Self::Number(n.into())
    }
}

impl From<i32> for SubjectId {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Which kind of entity a room is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomScope {
    Match,
    League,
}

impl RoomScope {
    pub fn prefix(&self) -> &'static str {
        match self {
            RoomScope::Match => "match",
            RoomScope::League => "league",
        }
    }
}

/// Broadcast room name.
///
/// Format: `match_{id}` or `league_{id}`. Treated as an opaque string by the
/// hub; no normalization beyond stringifying the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomKey(pub String);

impl RoomKey {
    pub fn new(scope: RoomScope, id: &SubjectId) -> Self {
        Self(format!("{}_{}", scope.prefix(), id))
    }

    pub fn for_match(id: &SubjectId) -> Self {
        Self::new(RoomScope::Match, id)
    }

    pub fn for_league(id: &SubjectId) -> Self {
        Self::new(RoomScope::League, id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}
