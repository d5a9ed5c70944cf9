//! Persistence adapter - JSON exchange boundary
//!
//! Parsing and version gating live here, away from business logic; so does
//! the explicit set↔array conversion for the collapse state (internally a
//! set, an array on the wire).
//!
//! Versioning follows a hard-migration policy: payloads from any other
//! schema version are rejected wholesale, never transformed.

use std::collections::BTreeSet;

use orgchart_types::{ChartExport, EXPORT_VERSION};

use crate::error::{ChartError, ChartResult};

/// Parse and validate an exchange payload. Missing required keys or a
/// foreign version reject the whole payload.
pub fn parse_export(json: &str) -> ChartResult<ChartExport> {
    let export: ChartExport =
        serde_json::from_str(json).map_err(|e| ChartError::ImportFormat(e.to_string()))?;
    if export.version != EXPORT_VERSION {
        return Err(ChartError::UnsupportedVersion {
            found: export.version,
            expected: EXPORT_VERSION,
        });
    }
    Ok(export)
}

pub fn to_json(export: &ChartExport) -> ChartResult<String> {
    serde_json::to_string_pretty(export).map_err(|e| ChartError::Serialization(e.to_string()))
}

pub fn collapse_set_from_list(list: &[String]) -> BTreeSet<String> {
    list.iter().cloned().collect()
}

pub fn collapse_list_from_set(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_version_rejected() {
        let json = r#"{
            "version": 2,
            "exportDate": "2026-01-15T10:00:00Z",
            "selectedQuarter": "P1",
            "departments": [],
            "roleTemplates": [],
            "personNodes": [],
            "collapsedNodes": []
        }"#;
        let err = parse_export(json).unwrap_err();
        assert_eq!(
            err,
            ChartError::UnsupportedVersion {
                found: 2,
                expected: EXPORT_VERSION
            }
        );
    }

    #[test]
    fn test_missing_key_is_format_error() {
        let err = parse_export("{\"version\": 1}").unwrap_err();
        assert!(matches!(err, ChartError::ImportFormat(_)));
    }

    #[test]
    fn test_collapse_roundtrip_dedups() {
        let list = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        let set = collapse_set_from_list(&list);
        assert_eq!(collapse_list_from_set(&set), ["a", "b"]);
    }
}
