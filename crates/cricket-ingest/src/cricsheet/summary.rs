//! Match summary extraction

use super::models::{MatchSummary, RawMargin, RawMatch};
use super::SchemaError;

/// Build the match-level row. Missing optional attributes become `None`.
pub fn extract_summary(raw: &RawMatch, match_id: &str) -> Result<MatchSummary, SchemaError> {
    let info = raw.info.as_ref().ok_or(SchemaError::MissingInfo)?;

    // Both teams or neither, except that a lone listed team stays in team1
    let mut teams = info.teams.iter().cloned();
    let team1 = teams.next();
    let team2 = teams.next();

    let toss = info.toss.as_ref();
    let outcome = info.outcome.as_ref();

    Ok(MatchSummary {
        match_id: match_id.to_string(),
        match_type: info.match_type.clone(),
        match_type_number: info.match_type_number,
        gender: info.gender.clone(),
        venue: info.venue.clone(),
        city: info.city.clone(),
        dates: info.dates.first().map(stringify_date),
        team1,
        team2,
        toss_winner: toss.and_then(|t| t.winner.clone()),
        toss_decision: toss.and_then(|t| t.decision.clone()),
        winner: outcome.and_then(|o| o.winner.clone()),
        result_type: outcome.and_then(|o| o.result.clone()),
        result_margin: outcome.and_then(|o| o.by.as_ref()).and_then(format_margin),
        player_of_match: info
            .player_of_match
            .as_ref()
            .and_then(|p| p.first())
            .map(str::to_string),
    })
}

fn stringify_date(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_margin(by: &RawMargin) -> Option<String> {
    match (by.innings, by.runs, by.wickets) {
        (Some(_), Some(runs), _) => Some(format!("innings and {} runs", runs)),
        (_, Some(runs), _) => Some(format!("{} runs", runs)),
        (_, None, Some(wickets)) => Some(format!("{} wickets", wickets)),
        _ => None,
    }
}
