//! Delivery normalizer
//!
//! Flattens `innings -> overs -> deliveries` into canonical rows. Over and ball
//! numbers are positional counters (source position + 1); the source's own
//! `over` index is never used, so an over that lost deliveries still numbers
//! its remaining balls 1..n.
//!
//! Only the first dismissal of a delivery and the first fielder of that
//! dismissal are kept. Two dismissals on one ball are rare enough that the
//! extra row shape is not worth carrying.

use super::models::{NormalizedDelivery, RawDelivery, RawInnings, RawMatch};
use super::{DeliveryLocation, SchemaError};

type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Normalize the innings at `innings_index` (0-based).
pub fn normalize_innings(
    raw: &RawMatch,
    innings_index: usize,
) -> SchemaResult<Vec<NormalizedDelivery>> {
    let innings = raw
        .innings
        .get(innings_index)
        .ok_or(SchemaError::InningsOutOfRange {
            index: innings_index,
            count: raw.innings.len(),
        })?;

    flatten_innings(innings, innings_index)
}

/// Normalize every innings in source order.
///
/// The first schema error aborts the whole match.
pub fn normalize_match(raw: &RawMatch) -> SchemaResult<Vec<Vec<NormalizedDelivery>>> {
    raw.innings
        .iter()
        .enumerate()
        .map(|(index, innings)| flatten_innings(innings, index))
        .collect()
}

fn flatten_innings(
    innings: &RawInnings,
    innings_index: usize,
) -> SchemaResult<Vec<NormalizedDelivery>> {
    let capacity = innings.overs.iter().map(|o| o.deliveries.len()).sum();
    let mut rows = Vec::with_capacity(capacity);

    for (over_index, over) in innings.overs.iter().enumerate() {
        for (delivery_index, delivery) in over.deliveries.iter().enumerate() {
            let location = DeliveryLocation {
                innings: innings_index,
                over: over_index,
                delivery: delivery_index,
            };
            rows.push(normalize_delivery(delivery, location)?);
        }
    }

    Ok(rows)
}

fn normalize_delivery(
    raw: &RawDelivery,
    location: DeliveryLocation,
) -> SchemaResult<NormalizedDelivery> {
    let batter = required(&raw.batter, "batter", location)?;
    let non_striker = required(&raw.non_striker, "non_striker", location)?;
    let bowler = required(&raw.bowler, "bowler", location)?;
    let runs = raw.runs.ok_or(SchemaError::MissingField {
        field: "runs",
        location,
    })?;
    let extras = raw.extras.unwrap_or_default();

    let wicket = raw.wickets.as_deref().and_then(|w| w.first());
    let wicket_player_out = match wicket {
        Some(w) => Some(required(&w.player_out, "wickets.player_out", location)?),
        None => None,
    };
    let wicket_fielder = wicket
        .and_then(|w| w.fielders.as_deref())
        .and_then(|fielders| fielders.first())
        .and_then(|f| f.name.clone());

    Ok(NormalizedDelivery {
        innings_number: to_i32(location.innings),
        overs: to_i32(location.over + 1),
        balls: to_i32(location.delivery + 1),
        batter,
        non_striker,
        bowler,
        runs_batter: runs.batter.unwrap_or(0),
        runs_extras: runs.extras.unwrap_or(0),
        runs_total: runs.total.unwrap_or(0),
        extras_wides: extras.wides,
        extras_legbyes: extras.legbyes,
        extras_noballs: extras.noballs,
        extras_byes: extras.byes,
        wicket_player_out,
        wicket_kind: wicket.and_then(|w| w.kind.clone()),
        wicket_fielder,
        description: String::new(),
        ball_areas: String::new(),
        is_drs: String::new(),
        is_umpires_call: String::new(),
    })
}

fn required(
    value: &Option<String>,
    field: &'static str,
    location: DeliveryLocation,
) -> SchemaResult<String> {
    value
        .clone()
        .ok_or(SchemaError::MissingField { field, location })
}

// Positions come from in-memory vectors; anything past i32::MAX is not a
// real match file.
fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Per-innings totals, reported at debug level after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InningsTotals {
    pub innings_number: usize,
    pub team: Option<String>,
    pub deliveries: usize,
    pub runs: i64,
    pub wickets: usize,
}

impl InningsTotals {
    pub fn from_rows(innings_number: usize, team: Option<&str>, rows: &[NormalizedDelivery]) -> Self {
        Self {
            innings_number,
            team: team.map(str::to_string),
            deliveries: rows.len(),
            runs: rows.iter().map(|d| i64::from(d.runs_total)).sum(),
            wickets: rows.iter().filter(|d| d.is_wicket()).count(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cricsheet::loader::parse_match;

    fn match_from(innings_json: &str) -> RawMatch {
        let text = format!(r#"{{"info": {{}}, "innings": {}}}"#, innings_json);
        parse_match(&text, "test.json").unwrap()
    }

    #[test]
    fn test_boundary_four() {
        let raw = match_from(
            r#"[{"team": "Nepal", "overs": [{"over": 0, "deliveries": [
                {"batter": "A", "non_striker": "B", "bowler": "C",
                 "runs": {"batter": 4, "extras": 0, "total": 4}}
            ]}]}]"#,
        );

        let rows = normalize_innings(&raw, 0).unwrap();
        let d = &rows[0];

        assert_eq!(d.key(), (0, 1, 1));
        assert_eq!((d.batter.as_str(), d.non_striker.as_str(), d.bowler.as_str()), ("A", "B", "C"));
        assert_eq!((d.runs_batter, d.runs_extras, d.runs_total), (4, 0, 4));
        assert_eq!(d.extras_wides, None);
        assert_eq!(d.extras_legbyes, None);
        assert_eq!(d.extras_noballs, None);
        assert_eq!(d.extras_byes, None);
        assert!(!d.is_wicket());
        assert_eq!(d.wicket_player_out, None);
        assert_eq!(d.wicket_kind, None);
        assert_eq!(d.wicket_fielder, None);
        assert_eq!(d.description, "");
        assert_eq!(d.ball_areas, "");
        assert_eq!(d.is_drs, "");
        assert_eq!(d.is_umpires_call, "");
    }

    #[test]
    fn test_bowled_without_fielders() {
        let raw = match_from(
            r#"[{"team": "Oman", "overs": [
                {"over": 0, "deliveries": []},
                {"over": 1, "deliveries": [
                    {"batter": "X", "non_striker": "Y", "bowler": "Z",
                     "runs": {"batter": 0, "extras": 0, "total": 0},
                     "wickets": [{"player_out": "X", "kind": "bowled"}]}
                ]}
            ]}]"#,
        );

        let rows = normalize_innings(&raw, 0).unwrap();
        let d = &rows[0];

        assert_eq!(d.key(), (0, 2, 1));
        assert!(d.is_wicket());
        assert_eq!(d.wicket_player_out.as_deref(), Some("X"));
        assert_eq!(d.wicket_kind.as_deref(), Some("bowled"));
        assert_eq!(d.wicket_fielder, None);
    }

    #[test]
    fn test_caught_keeps_first_fielder_and_first_wicket() {
        let raw = match_from(
            r#"[{"team": "Oman", "overs": [{"deliveries": [
                {"batter": "X", "non_striker": "Y", "bowler": "Z",
                 "runs": {"batter": 0, "extras": 0, "total": 0},
                 "wickets": [
                    {"player_out": "X", "kind": "caught", "fielders": [{"name": "F1"}, {"name": "F2"}]},
                    {"player_out": "Y", "kind": "run out"}
                 ]}
            ]}]}]"#,
        );

        let d = &normalize_innings(&raw, 0).unwrap()[0];
        assert_eq!(d.wicket_player_out.as_deref(), Some("X"));
        assert_eq!(d.wicket_fielder.as_deref(), Some("F1"));
    }

    #[test]
    fn test_empty_fielders_and_empty_wickets() {
        let raw = match_from(
            r#"[{"overs": [{"deliveries": [
                {"batter": "X", "non_striker": "Y", "bowler": "Z",
                 "runs": {"batter": 0, "extras": 0, "total": 0},
                 "wickets": [{"player_out": "X", "kind": "run out", "fielders": []}]},
                {"batter": "Y", "non_striker": "W", "bowler": "Z",
                 "runs": {"batter": 0, "extras": 0, "total": 0},
                 "wickets": []}
            ]}]}]"#,
        );

        let rows = normalize_innings(&raw, 0).unwrap();
        assert!(rows[0].is_wicket());
        assert_eq!(rows[0].wicket_fielder, None);
        assert!(!rows[1].is_wicket());
    }

    #[test]
    fn test_partial_extras_and_missing_runs_fields() {
        let raw = match_from(
            r#"[{"overs": [{"deliveries": [
                {"batter": "A", "non_striker": "B", "bowler": "C",
                 "runs": {"batter": 0, "total": 1},
                 "extras": {"wides": 1}},
                {"batter": "A", "non_striker": "B", "bowler": "C",
                 "runs": {"batter": 0, "extras": 0, "total": 0},
                 "extras": {"legbyes": 0}}
            ]}]}]"#,
        );

        let rows = normalize_innings(&raw, 0).unwrap();
        assert_eq!(rows[0].runs_extras, 0);
        assert_eq!(rows[0].extras_wides, Some(1));
        assert_eq!(rows[0].extras_noballs, None);
        // An explicit zero is kept, not collapsed to None
        assert_eq!(rows[1].extras_legbyes, Some(0));
        assert_eq!(rows[1].extras_wides, None);
    }

    #[test]
    fn test_missing_bowler_reports_location() {
        let raw = match_from(
            r#"[{"overs": []}, {"overs": [
                {"deliveries": []},
                {"deliveries": [
                    {"batter": "A", "non_striker": "B", "bowler": "C", "runs": {"total": 0}},
                    {"batter": "A", "non_striker": "B", "runs": {"total": 0}}
                ]}
            ]}]"#,
        );

        let err = normalize_innings(&raw, 1).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingField {
                field: "bowler",
                location: DeliveryLocation {
                    innings: 1,
                    over: 1,
                    delivery: 1,
                },
            }
        );
        assert!(normalize_match(&raw).is_err());
    }

    #[test]
    fn test_missing_runs_is_schema_error() {
        let raw = match_from(
            r#"[{"overs": [{"deliveries": [{"batter": "A", "non_striker": "B", "bowler": "C"}]}]}]"#,
        );

        let err = normalize_innings(&raw, 0).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField { field: "runs", .. }));
    }

    #[test]
    fn test_wicket_without_player_out_is_schema_error() {
        let raw = match_from(
            r#"[{"overs": [{"deliveries": [
                {"batter": "A", "non_striker": "B", "bowler": "C", "runs": {"total": 0}},
                {"batter": "A", "non_striker": "B", "bowler": "C", "runs": {"total": 0},
                 "wickets": [{"kind": "retired hurt"}]}
            ]}]}]"#,
        );

        let err = normalize_innings(&raw, 0).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingField {
                field: "wickets.player_out",
                location: DeliveryLocation {
                    innings: 0,
                    over: 0,
                    delivery: 1,
                },
            }
        );
    }

    #[test]
    fn test_innings_out_of_range() {
        let raw = match_from("[]");
        assert_eq!(
            normalize_innings(&raw, 2).unwrap_err(),
            SchemaError::InningsOutOfRange { index: 2, count: 0 }
        );
    }

    #[test]
    fn test_keys_unique_and_count_preserved() {
        let over = r#"{"deliveries": [
            {"batter": "A", "non_striker": "B", "bowler": "C", "runs": {"total": 1}},
            {"batter": "A", "non_striker": "B", "bowler": "C", "runs": {"total": 0}},
            {"batter": "A", "non_striker": "B", "bowler": "C", "runs": {"total": 6}}
        ]}"#;
        let innings = format!(r#"[{{"overs": [{o}, {o}]}}, {{"overs": [{o}]}}]"#, o = over);
        let raw = match_from(&innings);

        let all: Vec<NormalizedDelivery> = normalize_match(&raw).unwrap().into_iter().flatten().collect();
        let keys: std::collections::HashSet<_> = all.iter().map(NormalizedDelivery::key).collect();

        assert_eq!(all.len(), 9);
        assert_eq!(keys.len(), 9);
        assert!(keys.contains(&(1, 1, 3)));
    }

    #[test]
    fn test_innings_totals() {
        let raw = match_from(
            r#"[{"team": "Nepal", "overs": [{"deliveries": [
                {"batter": "A", "non_striker": "B", "bowler": "C", "runs": {"batter": 4, "total": 4}},
                {"batter": "A", "non_striker": "B", "bowler": "C", "runs": {"total": 1}, "extras": {"wides": 1}},
                {"batter": "A", "non_striker": "B", "bowler": "C", "runs": {"total": 0},
                 "wickets": [{"player_out": "A", "kind": "lbw"}]}
            ]}]}]"#,
        );
        let rows = normalize_innings(&raw, 0).unwrap();

        let totals = InningsTotals::from_rows(0, raw.innings[0].team.as_deref(), &rows);
        assert_eq!(totals.deliveries, 3);
        assert_eq!(totals.runs, 5);
        assert_eq!(totals.wickets, 1);
        assert_eq!(totals.team.as_deref(), Some("Nepal"));
    }
}
