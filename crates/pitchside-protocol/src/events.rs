// Well-known event names on the viewer socket — must match the frontend's listeners.

// client -> server
pub const JOIN_MATCH: &str = "join_match";
pub const LEAVE_MATCH: &str = "leave_match";
pub const JOIN_LEAGUE: &str = "join_league";
pub const LEAVE_LEAGUE: &str = "leave_league";
pub const DISCONNECT: &str = "disconnect";

// server -> client acknowledgements
pub const JOINED_MATCH: &str = "joined_match";
pub const LEFT_MATCH: &str = "left_match";

// server -> room / global broadcasts
pub const MATCH_EVENT: &str = "match_event";
pub const SCORE_UPDATE: &str = "score_update";
pub const MATCH_STATUS_CHANGE: &str = "match_status_change";
pub const STATISTICS_UPDATE: &str = "statistics_update";
pub const LEAGUE_TABLE_UPDATE: &str = "league_table_update";
pub const NEW_NEWS: &str = "new_news";

// heartbeat
pub const TICK: &str = "tick";
