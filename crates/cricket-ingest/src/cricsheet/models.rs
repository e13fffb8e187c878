//! Raw and normalized cricsheet data models
//!
//! The `Raw*` types mirror the JSON as it appears on disk. Every attribute the
//! source format may omit is an `Option` (or defaults to empty), so absence is
//! visible to the normalizer instead of being guessed at runtime. Unknown
//! keys (`review`, `replacements`, `officials`, ...) are ignored.

use serde::{Deserialize, Serialize};

// ============================================================================
// Raw match document
// ============================================================================

/// One match file, fully materialized
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMatch {
    /// `None` when the file carries `"info": null`
    pub info: Option<RawMatchInfo>,
    pub innings: Vec<RawInnings>,
}

/// Free-form match metadata, reduced to the attributes the summary uses
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMatchInfo {
    pub match_type: Option<String>,
    pub match_type_number: Option<i32>,
    pub gender: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    /// Usually ISO date strings; kept as JSON values and stringified on use
    #[serde(default)]
    pub dates: Vec<serde_json::Value>,
    #[serde(default)]
    pub teams: Vec<String>,
    pub toss: Option<RawToss>,
    pub outcome: Option<RawOutcome>,
    pub player_of_match: Option<PlayerOfMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawToss {
    pub winner: Option<String>,
    pub decision: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawOutcome {
    pub winner: Option<String>,
    /// "tie", "draw", "no result"; absent when there is a winner
    pub result: Option<String>,
    pub by: Option<RawMargin>,
}

/// Winning margin, e.g. `{"runs": 45}` or `{"innings": 1, "runs": 12}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RawMargin {
    pub runs: Option<i32>,
    pub wickets: Option<i32>,
    pub innings: Option<i32>,
}

/// `player_of_match` is a list in current files and a bare name in some older ones
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PlayerOfMatch {
    Many(Vec<String>),
    One(String),
}

impl PlayerOfMatch {
    pub fn first(&self) -> Option<&str> {
        match self {
            PlayerOfMatch::Many(names) => names.first().map(String::as_str),
            PlayerOfMatch::One(name) => Some(name.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawInnings {
    pub team: Option<String>,
    /// Forfeited innings carry no overs
    #[serde(default)]
    pub overs: Vec<RawOver>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawOver {
    #[serde(default)]
    pub deliveries: Vec<RawDelivery>,
}

/// One ball as recorded in the source
///
/// The player names and `runs` are required by the canonical schema but are
/// still optional here: the normalizer reports their absence with the
/// delivery's location instead of failing the whole parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawDelivery {
    #[serde(alias = "batsman")]
    pub batter: Option<String>,
    pub non_striker: Option<String>,
    pub bowler: Option<String>,
    pub runs: Option<RawRuns>,
    pub extras: Option<RawExtras>,
    pub wickets: Option<Vec<RawWicket>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RawRuns {
    #[serde(alias = "batsman")]
    pub batter: Option<i32>,
    pub extras: Option<i32>,
    pub total: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RawExtras {
    pub wides: Option<i32>,
    pub legbyes: Option<i32>,
    pub noballs: Option<i32>,
    pub byes: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawWicket {
    pub player_out: Option<String>,
    pub kind: Option<String>,
    pub fielders: Option<Vec<RawFielder>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawFielder {
    pub name: Option<String>,
}

// ============================================================================
// Canonical records
// ============================================================================

/// Persisted column order of `cricket_deliveries`, identical for every match
/// regardless of which optional keys its source file used.
pub const DELIVERY_COLUMNS: [&str; 22] = [
    "match_id",
    "innings_number",
    "overs",
    "balls",
    "batter",
    "non_striker",
    "bowler",
    "runs_batter",
    "runs_extras",
    "runs_total",
    "extras_wides",
    "extras_legbyes",
    "extras_noballs",
    "extras_byes",
    "description",
    "ball_areas",
    "is_wicket",
    "wicket_player_out",
    "wicket_kind",
    "wicket_fielder",
    "is_drs",
    "is_umpires_call",
];

/// Persisted column order of `cricket_matches`; `created_at` is left to its column default
pub const MATCH_COLUMNS: [&str; 15] = [
    "match_id",
    "match_type",
    "match_type_number",
    "gender",
    "venue",
    "city",
    "dates",
    "team1",
    "team2",
    "toss_winner",
    "toss_decision",
    "winner",
    "result_type",
    "result_margin",
    "player_of_match",
];

/// One delivery flattened into the canonical schema.
///
/// The match id is not stored here; it belongs to the [`MatchSummary`] the
/// deliveries are persisted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDelivery {
    /// 0-based index of the innings within the match
    pub innings_number: i32,
    /// 1-based over counter assigned during normalization
    pub overs: i32,
    /// 1-based ball counter within the over
    pub balls: i32,

    pub batter: String,
    pub non_striker: String,
    pub bowler: String,

    pub runs_batter: i32,
    pub runs_extras: i32,
    pub runs_total: i32,

    /// `None`: this extra did not occur on the ball
    pub extras_wides: Option<i32>,
    pub extras_legbyes: Option<i32>,
    pub extras_noballs: Option<i32>,
    pub extras_byes: Option<i32>,

    pub wicket_player_out: Option<String>,
    pub wicket_kind: Option<String>,
    pub wicket_fielder: Option<String>,

    // Reserved for commentary enrichment
    pub description: String,
    pub ball_areas: String,
    pub is_drs: String,
    pub is_umpires_call: String,
}

impl NormalizedDelivery {
    /// True iff a dismissed player was recorded on this ball.
    pub fn is_wicket(&self) -> bool {
        self.wicket_player_out.is_some()
    }

    /// `(innings_number, overs, balls)`, unique within a match
    pub fn key(&self) -> (i32, i32, i32) {
        (self.innings_number, self.overs, self.balls)
    }
}

/// Match-level metadata, one per match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Source file name without extension
    pub match_id: String,
    pub match_type: Option<String>,
    pub match_type_number: Option<i32>,
    pub gender: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    /// First date of the match
    pub dates: Option<String>,
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub toss_winner: Option<String>,
    pub toss_decision: Option<String>,
    pub winner: Option<String>,
    pub result_type: Option<String>,
    /// e.g. "45 runs", "3 wickets", "innings and 12 runs"
    pub result_margin: Option<String>,
    pub player_of_match: Option<String>,
}
