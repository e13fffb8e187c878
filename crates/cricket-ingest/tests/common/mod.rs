//! Match file fixtures for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

/// One delivery with the given total, off the bat
pub fn delivery(batter: &str, bowler: &str, runs: i32) -> Value {
    json!({
        "batter": batter,
        "non_striker": "Non Striker",
        "bowler": bowler,
        "runs": {"batter": runs, "extras": 0, "total": runs}
    })
}

/// An innings of `deliveries` balls in overs of six whose totals sum to `runs`
pub fn innings(team: &str, deliveries: usize, runs: i32) -> Value {
    let count = i32::try_from(deliveries).unwrap_or(i32::MAX).max(1);
    let base = runs / count;
    let remainder = usize::try_from(runs % count).unwrap_or(0);

    let balls: Vec<Value> = (0..deliveries)
        .map(|i| {
            let total = if i < remainder { base + 1 } else { base };
            delivery(&format!("{} Batter {}", team, i % 11), "Some Bowler", total)
        })
        .collect();

    let overs: Vec<Value> = balls
        .chunks(6)
        .enumerate()
        .map(|(i, chunk)| json!({"over": i, "deliveries": chunk}))
        .collect();

    json!({"team": team, "overs": overs})
}

pub fn info(match_type: &str, winner: Option<&str>) -> Value {
    let mut info = json!({
        "match_type": match_type,
        "match_type_number": 4120,
        "gender": "male",
        "venue": "Tribhuvan University International Cricket Ground",
        "city": "Kirtipur",
        "dates": ["2019-02-12"],
        "teams": ["Nepal", "United Arab Emirates"],
        "toss": {"winner": "Nepal", "decision": "field"},
        "player_of_match": ["Sompal Kami"]
    });
    info["outcome"] = match winner {
        Some(team) => json!({"winner": team, "by": {"runs": 7}}),
        None => json!({"result": "no result"}),
    };
    info
}

pub fn match_document(info: Value, innings: Vec<Value>) -> Value {
    json!({
        "meta": {"data_version": "1.1.0", "created": "2019-02-20", "revision": 1},
        "info": info,
        "innings": innings
    })
}

/// A complete two-innings ODI
pub fn standard_match() -> Value {
    match_document(
        info("ODI", Some("Nepal")),
        vec![
            innings("Nepal", 50, 287),
            innings("United Arab Emirates", 48, 280),
        ],
    )
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    write_raw(dir, name, &value.to_string())
}

pub fn write_raw(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap_or_else(|e| panic!("write {}: {}", path.display(), e));
    path
}
