//! Editor configuration.

use crate::error::CommandResult;
use serde::Deserialize;
use vb_core::ModelError;
use vb_core::align::SNAP_TOLERANCE;

/// Tunables for an `Editor`. Every field has a default, so `{}` is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Snapping distance in canvas pixels. Default: **5**.
    pub snap_tolerance: f64,

    /// Maximum number of history entries. Default: unbounded.
    pub history_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: SNAP_TOLERANCE,
            history_limit: None,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON configuration. Blank input yields the defaults.
    pub fn from_json(json: &str) -> CommandResult<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| ModelError::from(e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_and_empty_object_are_default() {
        assert_eq!(EditorConfig::from_json("").unwrap(), EditorConfig::default());
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn camel_case_fields() {
        let config = EditorConfig::from_json(r#"{"snapTolerance": 8, "historyLimit": 50}"#).unwrap();
        assert_eq!(config.snap_tolerance, 8.0);
        assert_eq!(config.history_limit, Some(50));
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(EditorConfig::from_json("{\"snapTolerance\": \"wide\"}").is_err());
    }
}
