//! Raw match loader
//!
//! Reads a whole match file into a [`RawMatch`]. There is no streaming mode:
//! a match file is at most a few megabytes.

use std::path::Path;

use tracing::debug;

use super::models::RawMatch;
use super::{IngestError, Result};

const REQUIRED_TOP_LEVEL_KEYS: [&str; 2] = ["info", "innings"];

/// Read and parse one match file.
pub fn load_match(path: &Path) -> Result<RawMatch> {
    let origin = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        origin: origin.clone(),
        source,
    })?;

    debug!(path = %origin, bytes = text.len(), "Read match file");

    parse_match(&text, &origin)
}

/// Parse match JSON already in memory. `origin` only labels errors.
pub fn parse_match(text: &str, origin: &str) -> Result<RawMatch> {
    let document: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| IngestError::parse(origin, format!("invalid JSON: {}", e)))?;

    let object = document
        .as_object()
        .ok_or_else(|| IngestError::parse(origin, "top-level value is not a JSON object"))?;

    for key in REQUIRED_TOP_LEVEL_KEYS {
        if !object.contains_key(key) {
            return Err(IngestError::parse(
                origin,
                format!("missing top-level key `{}`", key),
            ));
        }
    }

    serde_json::from_value(document)
        .map_err(|e| IngestError::parse(origin, format!("unexpected structure: {}", e)))
}

/// Match id is the file name without its extension.
pub fn match_id_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            IngestError::parse(
                path.display().to_string(),
                "cannot derive a match id from the file name",
            )
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const MINIMAL: &str = r#"{
        "meta": {"data_version": "1.1.0"},
        "info": {"match_type": "ODI", "teams": ["Nepal", "Oman"]},
        "innings": [
            {"team": "Nepal", "overs": [
                {"over": 0, "deliveries": [
                    {"batter": "A", "non_striker": "B", "bowler": "C",
                     "runs": {"batter": 1, "extras": 0, "total": 1}}
                ]}
            ]}
        ]
    }"#;

    #[test]
    fn test_parse_minimal_match() {
        let raw = parse_match(MINIMAL, "1.json").unwrap();

        assert_eq!(raw.innings.len(), 1);
        assert_eq!(raw.innings[0].overs[0].deliveries.len(), 1);
        assert_eq!(
            raw.info.as_ref().unwrap().match_type.as_deref(),
            Some("ODI")
        );
    }

    #[test]
    fn test_truncated_json_is_parse_error() {
        let err = parse_match(r#"{"info": {"teams": ["#, "bad.json").unwrap_err();
        assert!(matches!(err, IngestError::Parse { ref origin, .. } if origin == "bad.json"));
    }

    #[test]
    fn test_non_object_is_parse_error() {
        let err = parse_match("[1, 2, 3]", "list.json").unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_missing_innings_key_is_parse_error() {
        let err = parse_match(r#"{"info": {}}"#, "x.json").unwrap_err();
        assert!(err.to_string().contains("innings"));
    }

    #[test]
    fn test_null_info_is_accepted_by_loader() {
        let raw = parse_match(r#"{"info": null, "innings": []}"#, "x.json").unwrap();
        assert!(raw.info.is_none());
    }

    #[test]
    fn test_wrong_shape_is_parse_error() {
        let err = parse_match(r#"{"info": {}, "innings": {"team": "Nepal"}}"#, "x.json").unwrap_err();
        assert!(err.to_string().contains("unexpected structure"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_match(Path::new("/nonexistent/dir/1.json")).unwrap_err();
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1153840.json");
        std::fs::write(&path, MINIMAL).unwrap();

        let raw = load_match(&path).unwrap();
        assert_eq!(raw.innings[0].team.as_deref(), Some("Nepal"));
    }

    #[test]
    fn test_match_id_from_path() {
        assert_eq!(
            match_id_from_path(&PathBuf::from("data/1153840.json")).unwrap(),
            "1153840"
        );
        assert_eq!(
            match_id_from_path(&PathBuf::from("/abs/nep_v_oma.JSON")).unwrap(),
            "nep_v_oma"
        );
        assert!(match_id_from_path(&PathBuf::from("/")).is_err());
    }
}
